//! Core Types for ETHPool
//!
//! Fundamental data structures shared by the pool contracts.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for account identities (32-byte hash)
pub type Address = [u8; 32];

/// Native value in base units (wei)
pub type Amount = u128;

/// Units of proportional ownership of the pool
pub type Shares = u128;

// ============ Pool Types ============

/// Aggregate share ledger
///
/// `total_value / total_shares` is the price per share. Deposits mint at
/// that price, distributions raise it, withdrawals burn at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    /// Sum of every account's shares
    pub total_shares: Shares,
    /// Value held by the pool (principal plus undistributed rewards)
    pub total_value: Amount,
}

impl PoolState {
    /// Creates an empty pool
    pub fn new() -> Self {
        Self {
            total_shares: 0,
            total_value: 0,
        }
    }

    /// True when no shares are outstanding
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Value left behind by floor rounding once every share is burned
    pub fn dust(&self) -> Amount {
        if self.total_shares == 0 {
            self.total_value
        } else {
            0
        }
    }
}

/// A depositor's holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Account {
    /// Shares currently held
    pub shares: Shares,
}

impl Account {
    pub fn new(shares: Shares) -> Self {
        Self { shares }
    }

    /// True when the account has something to withdraw
    pub fn has_shares(&self) -> bool {
        self.shares > 0
    }
}

// ============ Config ============

/// Immutable pool configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EthPoolConfig {
    /// The only identity allowed to distribute rewards
    pub team: Address,
}

impl EthPoolConfig {
    pub fn new(team: Address) -> Self {
        Self { team }
    }
}

// ============ Actions ============

/// Pool operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Contribute value and receive shares
    Deposit { amount: Amount },
    /// Inject rewards for current holders (team only)
    DistributeRewards { amount: Amount },
    /// Burn all shares and receive their value
    Withdraw,
}

impl PoolAction {
    /// Value attached to the call
    pub fn attached_value(&self) -> Amount {
        match self {
            Self::Deposit { amount } | Self::DistributeRewards { amount } => *amount,
            Self::Withdraw => 0,
        }
    }
}
