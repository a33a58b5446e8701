//! ETHPool Contract
//!
//! Depositors pool ETH; the team periodically adds rewards which accrue to
//! whoever holds shares at that moment, in proportion to their shares.
//!
//! ## Execution Model
//!
//! - Each public operation is one atomic unit: it either commits fully or
//!   returns an error with the pool untouched
//! - The pool is an owned value passed by reference; hosts without
//!   transaction-level atomicity wrap it in a [`shared::SharedPool`]
//! - The only point where control leaves the pool is the payout at the end of
//!   [`EthPool::withdraw`]. The ledger is fully updated before the payout, so
//!   a recipient that calls back into the pool sees its holding already gone.

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub mod transfer;
pub mod host;
pub mod shared;
pub mod deployment;
pub mod query;
pub mod simulation;

pub use transfer::{RejectingReceiver, ValueReceiver, Wallets};

use ethpool_common::{
    access_control::authorize,
    errors::{EthPoolError, EthPoolResult},
    events::{EventLog, EthPoolEvent},
    ledger::{
        execute_deposit, execute_distribute, execute_withdraw, get_pool_stats, revert_withdraw,
        user_value, DepositRequest, DepositResult, DistributeRequest, DistributeResult,
        PoolStats, WithdrawRequest, WithdrawResult,
    },
    math::price_per_share,
    types::{Account, Address, Amount, EthPoolConfig, PoolAction, PoolState, Shares},
};

// ============ Pool ============

/// The custodial share pool
#[derive(Debug, Clone)]
pub struct EthPool {
    /// Immutable configuration
    config: EthPoolConfig,
    /// Aggregate ledger
    state: PoolState,
    /// Per-account holdings; zeroed on withdraw
    accounts: HashMap<Address, Account>,
    /// Height stamped on emitted events
    block_height: u64,
    /// Event log
    events: EventLog,
    /// Undo records of operations run while a payout is outstanding
    journal: Vec<UndoRecord>,
    /// Payouts currently waiting on their receiver
    payout_depth: usize,
}

/// Prior values of everything one operation touches
#[derive(Debug, Clone, Copy)]
struct UndoRecord {
    account: Address,
    holding: Option<Account>,
    state: PoolState,
    events: usize,
}

/// Outcome of a dispatched [`PoolAction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deposited(DepositResult),
    Distributed(DistributeResult),
    Withdrawn(WithdrawResult),
}

impl EthPool {
    /// Construct the pool with its reward distributor
    pub fn new(team: Address) -> Self {
        Self::with_block_height(team, 0)
    }

    /// Construct the pool at a given block height
    pub fn with_block_height(team: Address, block_height: u64) -> Self {
        let mut events = EventLog::new();
        events.emit(EthPoolEvent::PoolCreated { team, block_height });

        Self {
            config: EthPoolConfig::new(team),
            state: PoolState::new(),
            accounts: HashMap::new(),
            block_height,
            events,
            journal: Vec::new(),
            payout_depth: 0,
        }
    }

    pub fn config(&self) -> &EthPoolConfig {
        &self.config
    }

    /// The reward distributor
    pub fn team(&self) -> Address {
        self.config.team
    }

    /// Current ledger totals
    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Advance the height stamped on subsequent events
    pub fn set_block_height(&mut self, block_height: u64) {
        self.block_height = block_height;
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain the event log
    pub fn take_events(&mut self) -> Vec<EthPoolEvent> {
        std::mem::take(&mut self.events).into_events()
    }

    // ============ Operations ============

    /// Dispatch an action on behalf of `caller`
    ///
    /// `receiver` is only used by `Withdraw`.
    pub fn execute(
        &mut self,
        caller: Address,
        action: &PoolAction,
        receiver: &mut dyn ValueReceiver,
    ) -> EthPoolResult<Outcome> {
        authorize(&self.config, &caller, action)?;

        match action {
            PoolAction::Deposit { amount } => self.deposit(caller, *amount).map(Outcome::Deposited),
            PoolAction::DistributeRewards { amount } => {
                self.distribute_rewards(caller, *amount).map(Outcome::Distributed)
            }
            PoolAction::Withdraw => self.withdraw(caller, receiver).map(Outcome::Withdrawn),
        }
    }

    /// Deposit `amount` and mint shares at the current price per share
    pub fn deposit(&mut self, caller: Address, amount: Amount) -> EthPoolResult<DepositResult> {
        let request = DepositRequest {
            depositor: caller,
            amount,
            block_height: self.block_height,
        };

        let undo = self.checkpoint(caller);
        let result = execute_deposit(&request, self.accounts.get(&caller), &mut self.state)?;
        self.accounts.insert(caller, result.account);
        self.record(undo);

        self.events.emit(EthPoolEvent::Deposited {
            depositor: caller,
            amount,
            shares_minted: result.shares_minted,
            total_shares: result.new_state.total_shares,
            total_value: result.new_state.total_value,
            block_height: self.block_height,
        });

        Ok(result)
    }

    /// Add `amount` of rewards for the current holders (team only)
    pub fn distribute_rewards(&mut self, caller: Address, amount: Amount) -> EthPoolResult<DistributeResult> {
        let request = DistributeRequest {
            caller,
            amount,
            block_height: self.block_height,
        };

        let undo = self.checkpoint(caller);
        let result = execute_distribute(&request, &self.config, &mut self.state)?;
        self.record(undo);

        self.events.emit(EthPoolEvent::RewardsDistributed {
            team: caller,
            amount,
            total_shares: result.new_state.total_shares,
            total_value: result.new_state.total_value,
            block_height: self.block_height,
        });

        Ok(result)
    }

    /// Burn every share of `caller` and pay out their value through `receiver`
    ///
    /// The ledger is settled before `receiver` runs. If the receiver refuses
    /// the payout, every operation it ran against the pool is undone, then the
    /// burn itself, and `TransferFailed` is returned.
    pub fn withdraw(&mut self, caller: Address, receiver: &mut dyn ValueReceiver) -> EthPoolResult<WithdrawResult> {
        let account = self.accounts.get(&caller).copied().unwrap_or_default();
        let request = WithdrawRequest {
            depositor: caller,
            block_height: self.block_height,
        };

        let undo = self.checkpoint(caller);
        let result = execute_withdraw(&request, &account, &mut self.state)?;
        self.accounts.insert(caller, result.account);

        let base = self.journal.len();
        self.record(undo);
        let mark = self.journal.len();

        // Control may re-enter the pool from here on
        self.payout_depth += 1;
        let delivered = receiver.receive(self, caller, result.payout);
        self.payout_depth -= 1;

        if delivered.is_err() {
            self.rollback_to(mark);
            let restored = revert_withdraw(&result, &mut self.state)?;
            let holding = self.accounts.entry(caller).or_default();
            holding.shares = holding.shares
                .checked_add(restored)
                .ok_or(EthPoolError::Overflow)?;
            self.journal.truncate(base);

            return Err(EthPoolError::TransferFailed {
                to: caller,
                amount: result.payout,
            });
        }

        self.events.emit(EthPoolEvent::Withdrawn {
            depositor: caller,
            shares_burned: result.shares_burned,
            payout: result.payout,
            total_shares: self.state.total_shares,
            total_value: self.state.total_value,
            block_height: self.block_height,
        });

        if self.payout_depth == 0 {
            self.journal.clear();
        }

        Ok(result)
    }

    // ============ Undo Journal ============

    fn checkpoint(&self, account: Address) -> UndoRecord {
        UndoRecord {
            account,
            holding: self.accounts.get(&account).copied(),
            state: self.state,
            events: self.events.len(),
        }
    }

    /// Keep `undo` while a payout may still be refused
    fn record(&mut self, undo: UndoRecord) {
        if self.payout_depth > 0 {
            self.journal.push(undo);
        }
    }

    /// Undo every recorded operation after the first `mark`, newest first
    fn rollback_to(&mut self, mark: usize) {
        let undone = self.journal.split_off(mark);
        for undo in undone.into_iter().rev() {
            self.state = undo.state;
            match undo.holding {
                Some(holding) => {
                    self.accounts.insert(undo.account, holding);
                }
                None => {
                    self.accounts.remove(&undo.account);
                }
            }
            self.events.truncate(undo.events);
        }
    }

    // ============ Views ============

    /// Current value of an account's holding
    pub fn user_balance(&self, who: &Address) -> Amount {
        let account = self.accounts.get(who).copied().unwrap_or_default();
        // A holding never exceeds total_shares, so the quotient always fits
        user_value(&account, &self.state).unwrap_or(0)
    }

    /// Value held by the pool
    pub fn total_balance(&self) -> Amount {
        self.state.total_value
    }

    /// Shares held by an account
    pub fn shares_of(&self, who: &Address) -> Shares {
        self.accounts.get(who).map(|a| a.shares).unwrap_or(0)
    }

    /// Price per share scaled by `PRICE_PRECISION`
    pub fn price_per_share(&self) -> EthPoolResult<u128> {
        price_per_share(&self.state)
    }

    pub fn pool_stats(&self) -> EthPoolResult<PoolStats> {
        get_pool_stats(&self.state)
    }

    /// Number of accounts currently holding shares
    pub fn holder_count(&self) -> usize {
        self.accounts.values().filter(|a| a.has_shares()).count()
    }

    /// Verify the ledger totals against every account
    ///
    /// Walks all accounts, so this is meant for audits and tests rather than
    /// the operation path.
    pub fn check_invariants(&self) -> EthPoolResult<()> {
        let mut share_sum: Shares = 0;
        for account in self.accounts.values() {
            if account.shares > self.state.total_shares {
                return Err(EthPoolError::InvariantViolated {
                    invariant: "account holds more than total shares",
                });
            }
            share_sum = share_sum
                .checked_add(account.shares)
                .ok_or(EthPoolError::Overflow)?;
        }

        if share_sum != self.state.total_shares {
            return Err(EthPoolError::InvariantViolated {
                invariant: "account shares do not sum to total shares",
            });
        }

        if self.state.total_shares > 0 && self.state.total_value == 0 {
            return Err(EthPoolError::InvariantViolated {
                invariant: "outstanding shares back no value",
            });
        }

        Ok(())
    }

    // ============ Snapshots ============

    /// Capture the full pool for storage
    pub fn snapshot(&self) -> PoolSnapshot {
        let mut accounts: Vec<(Address, Account)> = self.accounts
            .iter()
            .map(|(address, account)| (*address, *account))
            .collect();
        accounts.sort_by(|a, b| a.0.cmp(&b.0));

        PoolSnapshot {
            config: self.config,
            state: self.state,
            accounts,
            block_height: self.block_height,
        }
    }

    /// Rebuild a pool from a snapshot; the event log starts empty
    pub fn restore(snapshot: PoolSnapshot) -> EthPoolResult<Self> {
        let pool = Self {
            config: snapshot.config,
            state: snapshot.state,
            accounts: snapshot.accounts.into_iter().collect(),
            block_height: snapshot.block_height,
            events: EventLog::new(),
            journal: Vec::new(),
            payout_depth: 0,
        };
        pool.check_invariants()?;
        Ok(pool)
    }
}

/// Serializable image of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolSnapshot {
    pub config: EthPoolConfig,
    pub state: PoolState,
    /// Accounts sorted by address
    pub accounts: Vec<(Address, Account)>,
    pub block_height: u64,
}

impl PoolSnapshot {
    /// Serialize snapshot to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

// ============ Tests ============
