//! Well integration shim
//!
//! A minimal liquidity pool that drives its pumps the way a production Well
//! does: every operation reports the reserves as they stood before it to
//! each pump, then commits its own accounting. An operation that fails leaves
//! both the Well and its pumps untouched. Pump failures are logged and never
//! block the Well.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use primitive_types::U256;
use thiserror::Error;
use tracing::{debug, warn};
use well_types::{TokenAddress, WellAddress};

use crate::pump::{Pump, PumpError};
use crate::well_function::WellFunction;

/// Errors raised by Well operations
#[derive(Debug, Error)]
pub enum WellError {
    #[error("Token count mismatch: Well has {expected} tokens, got {got} amounts")]
    TokenCountMismatch { expected: usize, got: usize },

    #[error("Invalid token index {index} for a Well with {count} tokens")]
    InvalidTokenIndex { index: usize, count: usize },

    #[error("Swap requires two distinct tokens, got index {0} twice")]
    SameToken(usize),

    #[error("Slippage: {what} of {actual} is below the minimum {minimum}")]
    SlippageExceeded {
        what: &'static str,
        actual: u128,
        minimum: u128,
    },

    #[error("Insufficient LP tokens: requested {requested}, supply is {supply}")]
    InsufficientLpTokens { requested: u128, supply: u128 },

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Pump {0} is already borrowed")]
    PumpBusy(usize),

    #[error(transparent)]
    Function(#[from] anyhow::Error),

    #[error("Pump rejected: {0}")]
    Pump(#[from] PumpError),
}

/// Result type for Well operations
pub type WellResult<T> = std::result::Result<T, WellError>;

/// Shared handle to a pump; the same pump may serve many Wells
pub type SharedPump = Rc<RefCell<dyn Pump>>;

struct AttachedPump {
    pump: SharedPump,
    data: Vec<u8>,
}

/// Liquidity pool with pluggable pricing and pumps
pub struct Well<F: WellFunction> {
    address: WellAddress,
    tokens: Vec<TokenAddress>,
    well_function: F,
    reserves: Vec<u128>,
    lp_token_supply: u128,
    pumps: Vec<AttachedPump>,
}

impl<F: WellFunction> fmt::Debug for Well<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Well")
            .field("address", &self.address)
            .field("well_function", &self.well_function.symbol())
            .field("reserves", &self.reserves)
            .field("lp_token_supply", &self.lp_token_supply)
            .field("pumps", &self.pumps.len())
            .finish()
    }
}

impl<F: WellFunction> Well<F> {
    pub fn new(address: WellAddress, tokens: Vec<TokenAddress>, well_function: F) -> Self {
        let reserves = vec![0; tokens.len()];
        Self {
            address,
            tokens,
            well_function,
            reserves,
            lp_token_supply: 0,
            pumps: Vec::new(),
        }
    }

    pub fn address(&self) -> WellAddress {
        self.address
    }

    pub fn tokens(&self) -> &[TokenAddress] {
        &self.tokens
    }

    pub fn reserves(&self) -> &[u128] {
        &self.reserves
    }

    pub fn lp_token_supply(&self) -> u128 {
        self.lp_token_supply
    }

    pub fn well_function(&self) -> &F {
        &self.well_function
    }

    pub fn pump_count(&self) -> usize {
        self.pumps.len()
    }

    /// Attach a pump with its per-Well data; the pump must accept this token count
    pub fn attach_pump(&mut self, pump: SharedPump, data: Vec<u8>) -> WellResult<()> {
        pump.try_borrow_mut()
            .map_err(|_| WellError::PumpBusy(self.pumps.len()))?
            .attach(self.tokens.len(), &data)?;
        self.pumps.push(AttachedPump { pump, data });
        Ok(())
    }

    /// Report current reserves to every pump
    ///
    /// Called once an operation has passed every check and before it commits,
    /// so pumps see the pre-operation reserves and a rejected call reaches no pump.
    fn update_pumps(&self) {
        for (index, attached) in self.pumps.iter().enumerate() {
            let mut pump = match attached.pump.try_borrow_mut() {
                Ok(pump) => pump,
                Err(_) => {
                    warn!(well = %self.address, pump = index, "pump busy; update skipped");
                    continue;
                }
            };
            if let Err(error) = pump.update(self.address, &self.reserves, &attached.data) {
                warn!(well = %self.address, pump = index, %error, "pump update failed; continuing");
            }
        }
    }

    fn check_amounts(&self, amounts: &[u128]) -> WellResult<()> {
        if amounts.len() != self.tokens.len() {
            return Err(WellError::TokenCountMismatch {
                expected: self.tokens.len(),
                got: amounts.len(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> WellResult<()> {
        if index >= self.tokens.len() {
            return Err(WellError::InvalidTokenIndex {
                index,
                count: self.tokens.len(),
            });
        }
        Ok(())
    }

    /// Deposit `amounts`, minting LP tokens; returns the amount minted
    pub fn add_liquidity(&mut self, amounts: &[u128], min_lp_amount_out: u128) -> WellResult<u128> {
        self.check_amounts(amounts)?;

        let reserves = self
            .reserves
            .iter()
            .zip(amounts)
            .map(|(reserve, amount)| reserve.checked_add(*amount))
            .collect::<Option<Vec<_>>>()
            .ok_or(WellError::ArithmeticOverflow("add_liquidity reserves"))?;

        let new_supply = self.well_function.calc_lp_token_supply(&reserves)?;
        let minted = new_supply.saturating_sub(self.lp_token_supply);
        if minted < min_lp_amount_out {
            return Err(WellError::SlippageExceeded {
                what: "LP amount out",
                actual: minted,
                minimum: min_lp_amount_out,
            });
        }

        self.update_pumps();
        self.reserves = reserves;
        self.lp_token_supply += minted;
        debug!(well = %self.address, minted, supply = self.lp_token_supply, "liquidity added");
        Ok(minted)
    }

    /// Burn `lp_amount_in` for a proportional share of every reserve
    pub fn remove_liquidity(
        &mut self,
        lp_amount_in: u128,
        min_amounts_out: &[u128],
    ) -> WellResult<Vec<u128>> {
        self.check_amounts(min_amounts_out)?;
        if self.lp_token_supply == 0 || lp_amount_in > self.lp_token_supply {
            return Err(WellError::InsufficientLpTokens {
                requested: lp_amount_in,
                supply: self.lp_token_supply,
            });
        }

        let mut amounts_out = Vec::with_capacity(self.reserves.len());
        for (reserve, minimum) in self.reserves.iter().zip(min_amounts_out) {
            // lp_amount_in <= supply, so the share never exceeds the reserve
            let amount = (U256::from(*reserve) * U256::from(lp_amount_in)
                / U256::from(self.lp_token_supply))
            .low_u128();
            if amount < *minimum {
                return Err(WellError::SlippageExceeded {
                    what: "token amount out",
                    actual: amount,
                    minimum: *minimum,
                });
            }
            amounts_out.push(amount);
        }

        self.update_pumps();
        for (reserve, amount) in self.reserves.iter_mut().zip(&amounts_out) {
            *reserve -= amount;
        }
        self.lp_token_supply -= lp_amount_in;
        debug!(well = %self.address, burned = lp_amount_in, "liquidity removed");
        Ok(amounts_out)
    }

    /// Swap an exact `amount_in` of token `from` for token `to`
    pub fn swap_from(
        &mut self,
        from: usize,
        to: usize,
        amount_in: u128,
        min_amount_out: u128,
    ) -> WellResult<u128> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Err(WellError::SameToken(from));
        }

        let mut reserves = self.reserves.clone();
        reserves[from] = reserves[from]
            .checked_add(amount_in)
            .ok_or(WellError::ArithmeticOverflow("swap reserve in"))?;

        let reserve_to = self
            .well_function
            .calc_reserve(&reserves, to, self.lp_token_supply)?;
        let amount_out = reserves[to].saturating_sub(reserve_to);
        if amount_out < min_amount_out {
            return Err(WellError::SlippageExceeded {
                what: "swap amount out",
                actual: amount_out,
                minimum: min_amount_out,
            });
        }

        reserves[to] -= amount_out;
        self.update_pumps();
        self.reserves = reserves;
        debug!(well = %self.address, from, to, amount_in, amount_out, "swap executed");
        Ok(amount_out)
    }

    /// Set reserves to externally observed balances
    pub fn sync(&mut self, balances: &[u128]) -> WellResult<()> {
        self.check_amounts(balances)?;
        self.update_pumps();
        self.reserves = balances.to_vec();
        debug!(well = %self.address, reserves = ?self.reserves, "reserves synced");
        Ok(())
    }
}
