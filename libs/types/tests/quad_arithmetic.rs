//! Public-API checks for the log-domain arithmetic the pump relies on

use rust_decimal_macros::dec;
use well_types::{MathError, Quad, WellAddress};

#[test]
fn test_ema_weights_sum_to_one() {
    let alpha = Quad::from_decimal(dec!(0.5)).unwrap();
    let decay = alpha.powu(3).unwrap();
    let weight = Quad::ONE.checked_sub(decay).unwrap();

    // 8·(1 − 0.125) + 16·0.125
    let ema = Quad::from_u128(8)
        .checked_mul(weight)
        .unwrap()
        .checked_add(Quad::from_u128(16).checked_mul(decay).unwrap())
        .unwrap();
    assert_eq!(ema, Quad::from_u128(9));
}

#[test]
fn test_geometric_mean_of_log_reserves() {
    let logs: Vec<Quad> = [1u128 << 10, 1 << 20, 1 << 30]
        .iter()
        .map(|&r| Quad::log2_of_u128(r).unwrap())
        .collect();
    let sum = logs
        .iter()
        .try_fold(Quad::ZERO, |acc, &log| acc.checked_add(log))
        .unwrap();
    let mean = sum.checked_div(Quad::from_u128(3)).unwrap();
    assert_eq!(mean.pow2_to_u128().unwrap(), 1 << 20);
}

#[test]
fn test_storage_byte_order() {
    // sign 0, biased exponent 0x3FFF
    let bytes = Quad::ONE.to_be_bytes();
    assert_eq!(&bytes[..2], &[0x3F, 0xFF]);
    assert!(bytes[2..].iter().all(|&b| b == 0));
    assert_eq!(Quad::from_be_bytes(bytes), Quad::ONE);
}

#[test]
fn test_signed_ordering() {
    let mut values = vec![Quad::ONE, -Quad::TWO, Quad::HALF, Quad::ZERO, -Quad::HALF];
    values.sort();
    assert_eq!(
        values,
        vec![-Quad::TWO, -Quad::HALF, Quad::ZERO, Quad::HALF, Quad::ONE]
    );
}

#[test]
fn test_errors_propagate() {
    assert_eq!(Quad::log2_of_u128(0), Err(MathError::LogOfNonPositive));
    assert_eq!(
        Quad::ONE.checked_div(Quad::ZERO),
        Err(MathError::DivisionByZero)
    );
    assert_eq!(
        (-Quad::TWO).to_u128(),
        Err(MathError::NegativeToUnsigned)
    );
}

#[test]
fn test_well_address_from_hex() {
    let address = WellAddress::from_hex("0x00000000000000000000000000000000000000ff").unwrap();
    assert_eq!(address.as_bytes()[19], 0xFF);
    assert_eq!(
        address.to_string(),
        "WellAddress(0x00000000000000000000000000000000000000ff)"
    );
}
