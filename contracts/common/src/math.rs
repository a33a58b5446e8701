//! Mathematical Utilities for ETHPool
//!
//! Integer-only share accounting. Every division floors, and every
//! `a * b / c` is evaluated with a 256-bit intermediate product so that
//! 18-decimal amounts can be multiplied by share counts of the same
//! magnitude without overflowing.

use crate::constants::pool;
use crate::errors::{EthPoolError, EthPoolResult};
use crate::types::{Amount, PoolState, Shares};

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128` values as `(high, low)` halves
pub fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Cross terms that land on bits 64..128, plus the carry out of `ll`
    let mid = (ll >> 64) + (lh & LOW_MASK) + (hl & LOW_MASK);

    let low = (ll & LOW_MASK) | (mid << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

/// Calculate `floor(a * b / denominator)`
///
/// # Errors
/// * `DivisionByZero` if `denominator == 0`
/// * `Overflow` if the quotient does not fit in a `u128`
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> EthPoolResult<u128> {
    if denominator == 0 {
        return Err(EthPoolError::DivisionByZero);
    }

    let (high, low) = widening_mul(a, b);
    if high == 0 {
        return Ok(low / denominator);
    }

    // Quotient needs more than 128 bits
    if high >= denominator {
        return Err(EthPoolError::Overflow);
    }

    // Binary long division of (high:low) by denominator; `remainder < denominator`
    // holds at the top of every iteration.
    let mut remainder = high;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= denominator {
            remainder = remainder.wrapping_sub(denominator);
            quotient |= 1;
        }
    }

    Ok(quotient)
}

/// Calculate shares minted for a deposit
///
/// - Empty pool: shares = amount (price per share bootstraps at 1)
/// - Otherwise: shares = floor(amount * total_shares / total_value)
///
/// # Arguments
/// * `amount` - Value being deposited
/// * `state` - Ledger totals before the deposit
pub fn shares_for_deposit(amount: Amount, state: &PoolState) -> EthPoolResult<Shares> {
    if state.total_shares == 0 {
        return amount
            .checked_mul(pool::BOOTSTRAP_SHARES_PER_UNIT)
            .ok_or(EthPoolError::Overflow);
    }

    mul_div_floor(amount, state.total_shares, state.total_value)
}

/// Calculate the value of a share holding
///
/// value = floor(shares * total_value / total_shares), or 0 for an empty pool.
pub fn value_of_shares(shares: Shares, state: &PoolState) -> EthPoolResult<Amount> {
    if state.total_shares == 0 {
        return Ok(0);
    }

    mul_div_floor(shares, state.total_value, state.total_shares)
}

/// Price per share scaled by `PRICE_PRECISION`
///
/// An empty pool quotes the bootstrap price of exactly one.
pub fn price_per_share(state: &PoolState) -> EthPoolResult<u128> {
    if state.total_shares == 0 {
        return Ok(pool::PRICE_PRECISION);
    }

    mul_div_floor(state.total_value, pool::PRICE_PRECISION, state.total_shares)
}

/// Portion of a reward owed to a holding: floor(reward * shares / total_shares)
pub fn reward_portion(reward: Amount, shares: Shares, total_shares: Shares) -> EthPoolResult<Amount> {
    mul_div_floor(reward, shares, total_shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::value::ONE;

    #[test]
    fn test_widening_mul_small() {
        assert_eq!(widening_mul(6, 7), (0, 42));
        assert_eq!(widening_mul(0, u128::MAX), (0, 0));
    }

    #[test]
    fn test_widening_mul_max() {
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        let (high, low) = widening_mul(u128::MAX, u128::MAX);
        assert_eq!(high, u128::MAX - 1);
        assert_eq!(low, 1);
    }

    #[test]
    fn test_widening_mul_crosses_halves() {
        // 2^64 * 2^64 = 2^128
        let two_64 = 1u128 << 64;
        assert_eq!(widening_mul(two_64, two_64), (1, 0));
    }

    #[test]
    fn test_mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_floor(1, 1, 2).unwrap(), 0);
        assert_eq!(mul_div_floor(100, 300, 400).unwrap(), 75);
    }

    #[test]
    fn test_mul_div_floor_wide_intermediate() {
        // 300e18 * 100e18 overflows u128, the quotient does not
        let result = mul_div_floor(300 * ONE, 100 * ONE, 300 * ONE).unwrap();
        assert_eq!(result, 100 * ONE);

        let result = mul_div_floor(u128::MAX, u128::MAX, u128::MAX).unwrap();
        assert_eq!(result, u128::MAX);
    }

    #[test]
    fn test_mul_div_floor_wide_rounding() {
        // (2^127 * 3) / 2 = 3 * 2^126, then floor of an odd split
        let a = 1u128 << 127;
        assert_eq!(mul_div_floor(a, 3, 2).unwrap(), 3u128 << 126);
        assert_eq!(mul_div_floor(a, 3, 7).unwrap(), ((a / 7) * 3) + ((a % 7) * 3) / 7);
    }

    #[test]
    fn test_mul_div_floor_errors() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(EthPoolError::DivisionByZero));
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), Err(EthPoolError::Overflow));
    }

    #[test]
    fn test_bootstrap_deposit_mints_one_to_one() {
        let state = PoolState::new();
        assert_eq!(shares_for_deposit(100 * ONE, &state).unwrap(), 100 * ONE);
    }

    #[test]
    fn test_deposit_at_raised_price() {
        // 100 shares worth 300 => price 3, 300 in mints 100 shares
        let state = PoolState { total_shares: 100 * ONE, total_value: 300 * ONE };
        assert_eq!(shares_for_deposit(300 * ONE, &state).unwrap(), 100 * ONE);
    }

    #[test]
    fn test_deposit_below_price_mints_nothing() {
        let state = PoolState { total_shares: 1, total_value: 10 };
        assert_eq!(shares_for_deposit(9, &state).unwrap(), 0);
    }

    #[test]
    fn test_value_of_shares() {
        let state = PoolState { total_shares: 400 * ONE, total_value: 600 * ONE };
        assert_eq!(value_of_shares(100 * ONE, &state).unwrap(), 150 * ONE);
        assert_eq!(value_of_shares(300 * ONE, &state).unwrap(), 450 * ONE);
        assert_eq!(value_of_shares(0, &state).unwrap(), 0);
    }

    #[test]
    fn test_value_of_shares_empty_pool() {
        let state = PoolState { total_shares: 0, total_value: 5 };
        assert_eq!(value_of_shares(10, &state).unwrap(), 0);
    }

    #[test]
    fn test_price_per_share() {
        assert_eq!(price_per_share(&PoolState::new()).unwrap(), ONE);

        let state = PoolState { total_shares: 100, total_value: 300 };
        assert_eq!(price_per_share(&state).unwrap(), 3 * ONE);
    }

    #[test]
    fn test_reward_portion() {
        assert_eq!(reward_portion(200, 100, 400).unwrap(), 50);
        assert_eq!(reward_portion(200, 300, 400).unwrap(), 150);
        assert_eq!(reward_portion(1, 1, 3).unwrap(), 0);
    }
}
