//! Share Ledger Module
//!
//! The three state transitions of the pool, expressed over the aggregate
//! [`PoolState`] and a single depositor's [`Account`].
//!
//! ## Key Features
//!
//! - **Deposit**: Mints shares at the current price per share
//! - **Distribute**: Raises pool value without minting, so rewards land on
//!   existing shares only, in exact proportion
//! - **Withdraw**: Burns every share of the caller and prices the payout
//! - **All-or-nothing**: Each transition computes its new totals with checked
//!   arithmetic first and commits only when nothing can fail

use crate::{EthPoolError, EthPoolResult};
use crate::access_control::require_team;
use crate::math::{price_per_share, shares_for_deposit, value_of_shares};
use crate::types::{Account, Address, Amount, EthPoolConfig, PoolState, Shares};

// ============================================================================
// Types
// ============================================================================

/// Request to deposit into the pool
#[derive(Debug, Clone)]
pub struct DepositRequest {
    /// Depositor address
    pub depositor: Address,
    /// Value attached
    pub amount: Amount,
    /// Current block height
    pub block_height: u64,
}

/// Request to distribute rewards
#[derive(Debug, Clone)]
pub struct DistributeRequest {
    /// Caller address (must be the team)
    pub caller: Address,
    /// Reward value attached
    pub amount: Amount,
    /// Current block height
    pub block_height: u64,
}

/// Request to withdraw a full holding
#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    /// Depositor address
    pub depositor: Address,
    /// Current block height
    pub block_height: u64,
}

/// Result of a deposit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositResult {
    /// Updated account
    pub account: Account,
    /// Shares created by this deposit
    pub shares_minted: Shares,
    /// Pool totals after the deposit
    pub new_state: PoolState,
}

/// Result of a reward distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributeResult {
    /// Reward value added
    pub amount: Amount,
    /// Pool totals after the distribution
    pub new_state: PoolState,
}

/// Result of a withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawResult {
    /// Depositor being paid
    pub depositor: Address,
    /// Value owed to the depositor
    pub payout: Amount,
    /// Shares burned
    pub shares_burned: Shares,
    /// Account after the withdrawal (always zero shares)
    pub account: Account,
    /// Pool totals after the withdrawal
    pub new_state: PoolState,
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Outstanding shares
    pub total_shares: Shares,
    /// Value held
    pub total_value: Amount,
    /// Price per share scaled by `PRICE_PRECISION`
    pub price_per_share: u128,
    /// Rounding residue with no owner
    pub dust: Amount,
}

// ============================================================================
// Core Ledger Functions
// ============================================================================

/// Validate a deposit amount
pub fn validate_deposit(request: &DepositRequest) -> EthPoolResult<()> {
    if request.amount == 0 {
        return Err(EthPoolError::ZeroAmount);
    }
    Ok(())
}

/// Execute a deposit into the pool
///
/// Mints `floor(amount * total_shares / total_value)` shares, or `amount`
/// shares while the pool is empty. A deposit worth less than one share mints
/// nothing and its value accrues to the existing holders.
pub fn execute_deposit(
    request: &DepositRequest,
    existing: Option<&Account>,
    pool: &mut PoolState,
) -> EthPoolResult<DepositResult> {
    validate_deposit(request)?;

    let minted = shares_for_deposit(request.amount, pool)?;

    let held = existing.map(|a| a.shares).unwrap_or(0);
    let account = Account::new(held.checked_add(minted).ok_or(EthPoolError::Overflow)?);

    let new_state = PoolState {
        total_shares: pool.total_shares
            .checked_add(minted)
            .ok_or(EthPoolError::Overflow)?,
        total_value: pool.total_value
            .checked_add(request.amount)
            .ok_or(EthPoolError::Overflow)?,
    };

    *pool = new_state;

    Ok(DepositResult {
        account,
        shares_minted: minted,
        new_state,
    })
}

/// Execute a reward distribution
///
/// Only the team may call this. Rejected with `NoStakeholders` while no
/// shares exist: with nobody to credit, the value would otherwise fall to
/// whoever deposits next.
pub fn execute_distribute(
    request: &DistributeRequest,
    config: &EthPoolConfig,
    pool: &mut PoolState,
) -> EthPoolResult<DistributeResult> {
    require_team(config, &request.caller)?;

    if request.amount == 0 {
        return Err(EthPoolError::ZeroAmount);
    }
    if pool.is_empty() {
        return Err(EthPoolError::NoStakeholders { amount: request.amount });
    }

    let new_state = PoolState {
        total_shares: pool.total_shares,
        total_value: pool.total_value
            .checked_add(request.amount)
            .ok_or(EthPoolError::Overflow)?,
    };

    *pool = new_state;

    Ok(DistributeResult {
        amount: request.amount,
        new_state,
    })
}

/// Execute a full withdrawal from the pool
///
/// Commits, in order: pool value reduced by the payout, pool shares reduced
/// by the holding, holding zeroed (returned in the result). Paying the
/// depositor is left to the caller and must happen after the result is
/// stored, so a re-entrant withdraw sees zero shares.
pub fn execute_withdraw(
    request: &WithdrawRequest,
    account: &Account,
    pool: &mut PoolState,
) -> EthPoolResult<WithdrawResult> {
    if !account.has_shares() {
        return Err(EthPoolError::NoWithdrawableBalance {
            account: request.depositor,
        });
    }

    let shares = account.shares;
    let payout = value_of_shares(shares, pool)?;

    let total_value = pool.total_value
        .checked_sub(payout)
        .ok_or(EthPoolError::Underflow)?;
    let total_shares = pool.total_shares
        .checked_sub(shares)
        .ok_or(EthPoolError::Underflow)?;

    let new_state = PoolState { total_shares, total_value };
    *pool = new_state;

    Ok(WithdrawResult {
        depositor: request.depositor,
        payout,
        shares_burned: shares,
        account: Account::new(0),
        new_state,
    })
}

/// Undo a committed withdrawal whose payout could not be delivered
///
/// Adds the burned shares and the payout back onto the current totals, so
/// it composes with any operation that ran in between. Returns the holding
/// to credit back to the depositor.
pub fn revert_withdraw(result: &WithdrawResult, pool: &mut PoolState) -> EthPoolResult<Shares> {
    let total_value = pool.total_value
        .checked_add(result.payout)
        .ok_or(EthPoolError::Overflow)?;
    let total_shares = pool.total_shares
        .checked_add(result.shares_burned)
        .ok_or(EthPoolError::Overflow)?;

    pool.total_value = total_value;
    pool.total_shares = total_shares;

    Ok(result.shares_burned)
}

/// Current value of a holding
pub fn user_value(account: &Account, pool: &PoolState) -> EthPoolResult<Amount> {
    value_of_shares(account.shares, pool)
}

/// Calculate pool statistics
pub fn get_pool_stats(pool: &PoolState) -> EthPoolResult<PoolStats> {
    Ok(PoolStats {
        total_shares: pool.total_shares,
        total_value: pool.total_value,
        price_per_share: price_per_share(pool)?,
        dust: pool.dust(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::value::ONE;

    fn team() -> Address {
        [9u8; 32]
    }

    fn user_a() -> Address {
        [1u8; 32]
    }

    fn user_b() -> Address {
        [2u8; 32]
    }

    fn deposit(depositor: Address, amount: Amount) -> DepositRequest {
        DepositRequest { depositor, amount, block_height: 1 }
    }

    fn distribute(caller: Address, amount: Amount) -> DistributeRequest {
        DistributeRequest { caller, amount, block_height: 2 }
    }

    fn withdraw(depositor: Address) -> WithdrawRequest {
        WithdrawRequest { depositor, block_height: 3 }
    }

    #[test]
    fn test_first_deposit_bootstraps_price() {
        let mut pool = PoolState::new();

        let result = execute_deposit(&deposit(user_a(), 100 * ONE), None, &mut pool).unwrap();

        assert_eq!(result.shares_minted, 100 * ONE);
        assert_eq!(result.account.shares, 100 * ONE);
        assert_eq!(pool.total_shares, 100 * ONE);
        assert_eq!(pool.total_value, 100 * ONE);
    }

    #[test]
    fn test_deposit_adds_to_existing_account() {
        let mut pool = PoolState::new();
        let first = execute_deposit(&deposit(user_a(), 10), None, &mut pool).unwrap();
        let second = execute_deposit(&deposit(user_a(), 5), Some(&first.account), &mut pool).unwrap();

        assert_eq!(second.account.shares, 15);
        assert_eq!(pool.total_shares, 15);
    }

    #[test]
    fn test_deposit_zero_rejected() {
        let mut pool = PoolState::new();
        let result = execute_deposit(&deposit(user_a(), 0), None, &mut pool);

        assert_eq!(result, Err(EthPoolError::ZeroAmount));
        assert_eq!(pool, PoolState::new());
    }

    #[test]
    fn test_deposit_below_price_credits_holders() {
        // Price per share is 10, a deposit of 5 mints zero shares
        let mut pool = PoolState { total_shares: 1, total_value: 10 };

        let result = execute_deposit(&deposit(user_b(), 5), None, &mut pool).unwrap();

        assert_eq!(result.shares_minted, 0);
        assert_eq!(result.account.shares, 0);
        assert_eq!(pool, PoolState { total_shares: 1, total_value: 15 });
        assert_eq!(user_value(&Account::new(1), &pool).unwrap(), 15);
    }

    #[test]
    fn test_deposit_overflow_leaves_state() {
        let mut pool = PoolState { total_shares: u128::MAX - 1, total_value: u128::MAX - 1 };
        let before = pool;

        let result = execute_deposit(&deposit(user_a(), 10), None, &mut pool);

        assert_eq!(result, Err(EthPoolError::Overflow));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_distribute_raises_value_only() {
        let mut pool = PoolState { total_shares: 400, total_value: 400 };
        let config = EthPoolConfig::new(team());

        let result = execute_distribute(&distribute(team(), 200), &config, &mut pool).unwrap();

        assert_eq!(result.new_state, PoolState { total_shares: 400, total_value: 600 });
        assert_eq!(pool.total_shares, 400);
    }

    #[test]
    fn test_distribute_by_outsider_rejected() {
        let mut pool = PoolState { total_shares: 400, total_value: 400 };
        let before = pool;
        let config = EthPoolConfig::new(team());

        let result = execute_distribute(&distribute(user_a(), 200), &config, &mut pool);

        assert!(matches!(result, Err(EthPoolError::Unauthorized { .. })));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_distribute_checks_caller_before_amount() {
        let mut pool = PoolState::new();
        let config = EthPoolConfig::new(team());

        let result = execute_distribute(&distribute(user_a(), 0), &config, &mut pool);
        assert!(matches!(result, Err(EthPoolError::Unauthorized { .. })));
    }

    #[test]
    fn test_distribute_to_empty_pool_rejected() {
        let mut pool = PoolState::new();
        let config = EthPoolConfig::new(team());

        let result = execute_distribute(&distribute(team(), 50), &config, &mut pool);

        assert_eq!(result, Err(EthPoolError::NoStakeholders { amount: 50 }));
        assert_eq!(pool, PoolState::new());
    }

    #[test]
    fn test_distribute_zero_rejected() {
        let mut pool = PoolState { total_shares: 1, total_value: 1 };
        let config = EthPoolConfig::new(team());

        let result = execute_distribute(&distribute(team(), 0), &config, &mut pool);
        assert_eq!(result, Err(EthPoolError::ZeroAmount));
    }

    #[test]
    fn test_withdraw_pays_proportional_value() {
        let mut pool = PoolState { total_shares: 400, total_value: 600 };
        let account = Account::new(100);

        let result = execute_withdraw(&withdraw(user_a()), &account, &mut pool).unwrap();

        assert_eq!(result.payout, 150);
        assert_eq!(result.shares_burned, 100);
        assert_eq!(result.account.shares, 0);
        assert_eq!(pool, PoolState { total_shares: 300, total_value: 450 });
    }

    #[test]
    fn test_withdraw_last_holder_drains_pool() {
        let mut pool = PoolState { total_shares: 300, total_value: 450 };
        let result = execute_withdraw(&withdraw(user_b()), &Account::new(300), &mut pool).unwrap();

        assert_eq!(result.payout, 450);
        assert_eq!(pool, PoolState::new());
    }

    #[test]
    fn test_withdraw_without_shares_rejected() {
        let mut pool = PoolState { total_shares: 300, total_value: 450 };
        let before = pool;

        let result = execute_withdraw(&withdraw(user_a()), &Account::default(), &mut pool);

        assert_eq!(result, Err(EthPoolError::NoWithdrawableBalance { account: user_a() }));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_withdraw_rounds_down_leaving_dust() {
        // Three equal holders of a pool worth 10: each is owed floor(10/3) = 3
        let mut pool = PoolState { total_shares: 3, total_value: 10 };

        let first = execute_withdraw(&withdraw(user_a()), &Account::new(1), &mut pool).unwrap();
        assert_eq!(first.payout, 3);
        assert_eq!(pool, PoolState { total_shares: 2, total_value: 7 });

        // The last holder takes everything that remains
        let rest = execute_withdraw(&withdraw(user_b()), &Account::new(2), &mut pool).unwrap();
        assert_eq!(rest.payout, 7);
        assert_eq!(pool.dust(), 0);
    }

    #[test]
    fn test_revert_withdraw_restores_totals() {
        let mut pool = PoolState { total_shares: 400, total_value: 600 };
        let before = pool;

        let result = execute_withdraw(&withdraw(user_a()), &Account::new(100), &mut pool).unwrap();
        let restored = revert_withdraw(&result, &mut pool).unwrap();

        assert_eq!(restored, 100);
        assert_eq!(pool, before);
    }

    #[test]
    fn test_user_value_and_stats() {
        let pool = PoolState { total_shares: 100 * ONE, total_value: 300 * ONE };

        assert_eq!(user_value(&Account::new(100 * ONE), &pool).unwrap(), 300 * ONE);

        let stats = get_pool_stats(&pool).unwrap();
        assert_eq!(stats.price_per_share, 3 * ONE);
        assert_eq!(stats.dust, 0);
    }
}
