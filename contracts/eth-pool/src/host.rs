//! Host
//!
//! Couples a pool with the wallet book so that every operation moves real
//! balances: deposits and distributions are pulled into custody before the
//! ledger sees them, withdraw payouts leave custody through the wallets.

use ethpool_common::errors::{EthPoolError, EthPoolResult};
use ethpool_common::ledger::{DepositResult, DistributeResult, WithdrawResult};
use ethpool_common::types::{Address, Amount, PoolAction};

use crate::deployment::deploy;
use crate::query::PoolReport;
use crate::transfer::Wallets;
use crate::{EthPool, Outcome};

/// A deployed pool together with the balances around it
#[derive(Debug, Clone)]
pub struct Host {
    pool: EthPool,
    wallets: Wallets,
    address: Address,
}

impl Host {
    /// Deploy a fresh pool for `team`
    pub fn deploy(team: Address, nonce: u64) -> Self {
        let (pool, address) = deploy(team, nonce, 0);
        Self {
            pool,
            wallets: Wallets::new(address),
            address,
        }
    }

    pub fn pool(&self) -> &EthPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EthPool {
        &mut self.pool
    }

    pub fn wallets(&self) -> &Wallets {
        &self.wallets
    }

    pub fn wallets_mut(&mut self) -> &mut Wallets {
        &mut self.wallets
    }

    /// Address holding the pooled value
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn fund(&mut self, who: Address, amount: Amount) -> EthPoolResult<()> {
        self.wallets.fund(who, amount)
    }

    pub fn balance_of(&self, who: &Address) -> Amount {
        self.wallets.balance_of(who)
    }

    /// Deposit `amount` from the caller's wallet
    pub fn deposit(&mut self, caller: Address, amount: Amount) -> EthPoolResult<DepositResult> {
        self.wallets.transfer(caller, self.address, amount)?;
        let result = self.pool.deposit(caller, amount);
        self.settle(caller, amount, result)
    }

    /// Distribute `amount` from the caller's wallet
    pub fn distribute_rewards(&mut self, caller: Address, amount: Amount) -> EthPoolResult<DistributeResult> {
        self.wallets.transfer(caller, self.address, amount)?;
        let result = self.pool.distribute_rewards(caller, amount);
        self.settle(caller, amount, result)
    }

    /// Withdraw the caller's holding into their wallet
    pub fn withdraw(&mut self, caller: Address) -> EthPoolResult<WithdrawResult> {
        self.pool.withdraw(caller, &mut self.wallets)
    }

    /// Dispatch an action, attaching its value from the caller's wallet
    pub fn execute(&mut self, caller: Address, action: &PoolAction) -> EthPoolResult<Outcome> {
        let attached = action.attached_value();
        if attached > 0 {
            self.wallets.transfer(caller, self.address, attached)?;
        }
        let result = self.pool.execute(caller, action, &mut self.wallets);
        self.settle(caller, attached, result)
    }

    /// Send value to the pool address without going through the ledger
    pub fn force_send(&mut self, from: Address, amount: Amount) -> EthPoolResult<()> {
        self.wallets.transfer(from, self.address, amount)
    }

    /// Custody balance alongside the ledger's view of it
    pub fn report(&self) -> PoolReport {
        PoolReport::new(self.address, self.wallets.custody(), self.pool.total_balance())
    }

    /// Refund the attached value when the ledger rejected the operation
    ///
    /// The ledger error is always returned as is. The refund cannot fail:
    /// custody was credited with `amount` in the same call and a rejected
    /// operation pays nothing out of it.
    fn settle<T>(&mut self, caller: Address, amount: Amount, result: EthPoolResult<T>) -> EthPoolResult<T> {
        if result.is_err() && amount > 0 {
            let refund = self.wallets.transfer(self.address, caller, amount);
            debug_assert!(refund.is_ok(), "custody holds the attached value");
        }
        result
    }
}
