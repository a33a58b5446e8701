//! Shared pool handle for hosts that call in from several threads
//!
//! Every operation holds the lock for its whole duration, payout included, so
//! operations are serialized exactly as they would be in a single-threaded
//! host.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ethpool_common::errors::EthPoolResult;
use ethpool_common::ledger::{DepositResult, DistributeResult, WithdrawResult};
use ethpool_common::types::{Address, Amount, PoolState};

use crate::transfer::ValueReceiver;
use crate::EthPool;

#[derive(Debug, Clone)]
pub struct SharedPool {
    inner: Arc<Mutex<EthPool>>,
}

impl SharedPool {
    pub fn new(pool: EthPool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Exclusive access to the pool
    ///
    /// Poisoned locks are recovered: operations commit their state in one step.
    pub fn lock(&self) -> MutexGuard<'_, EthPool> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn deposit(&self, caller: Address, amount: Amount) -> EthPoolResult<DepositResult> {
        self.lock().deposit(caller, amount)
    }

    pub fn distribute_rewards(&self, caller: Address, amount: Amount) -> EthPoolResult<DistributeResult> {
        self.lock().distribute_rewards(caller, amount)
    }

    pub fn withdraw(&self, caller: Address, receiver: &mut dyn ValueReceiver) -> EthPoolResult<WithdrawResult> {
        self.lock().withdraw(caller, receiver)
    }

    pub fn user_balance(&self, who: &Address) -> Amount {
        self.lock().user_balance(who)
    }

    pub fn total_balance(&self) -> Amount {
        self.lock().total_balance()
    }

    pub fn state(&self) -> PoolState {
        self.lock().state()
    }
}
