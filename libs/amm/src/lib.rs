//! # Well AMM Library - Manipulation-Resistant Reserve Oracle
//!
//! ## Purpose
//!
//! Liquidity pools ("Wells") with a pluggable pricing function and pluggable
//! reserve oracles ("pumps"). The geometric EMA pump tracks reserves as base-2
//! logs, caps how far they may move per block and keeps both an exponential
//! moving average and a time-integrated sum, so a single transaction cannot
//! drag the reported price.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve balances pushed by a Well before every operation
//! - **Output Destinations**: Price consumers reading instantaneous or
//!   time-weighted-average reserves
//! - **Persistence**: Any [`SlotStore`](well_codec::SlotStore); state is
//!   partitioned by Well address
//! - **Configuration**: [`PumpConfig`](well_config::PumpConfig) converted once
//!   into log-domain [`PumpParams`]
//!
//! ## Architecture Role
//!
//! ```text
//! Well::swap_from / add_liquidity / remove_liquidity / sync
//!     │  reserves before the operation
//!     ▼
//! Pump::update ──► cap ──► EMA + cumulative ──► SlotStore
//!                                                  │
//! readers ◄── instantaneous / cumulative / TWA ◄───┘
//! ```
//!
//! ## Failure Model
//!
//! - A failing pump update persists nothing for that Well
//! - The Well logs pump failures and carries on with its own accounting

pub mod pump;
pub mod well;
pub mod well_function;

pub use pump::{
    cap_reserve, Clock, CumulativeReserves, GeoEmaPump, InstantaneousReserves, ManualClock, Pump,
    PumpError, PumpParams, PumpRecord, PumpResult, PumpState, SystemClock,
};
pub use well::{SharedPump, Well, WellError, WellResult};
pub use well_function::{ConstantProduct2, WellFunction};

/// Common types for pump configuration
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
