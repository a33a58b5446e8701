//! Value Transfer
//!
//! The payout seam of the pool and a simple wallet book used by hosts to move
//! native value between accounts and the pool's custody.

use std::collections::HashMap;

use ethpool_common::errors::{EthPoolError, EthPoolResult};
use ethpool_common::types::{Address, Amount};

use crate::EthPool;

/// Recipient side of a payout
///
/// The pool hands itself to the receiver, so an implementation may call back
/// into any pool operation before returning. Returning an error refuses the
/// payout and undoes every pool operation made during the call.
pub trait ValueReceiver {
    fn receive(&mut self, pool: &mut EthPool, to: Address, amount: Amount) -> EthPoolResult<()>;
}

/// Receiver that refuses every payout
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingReceiver;

impl ValueReceiver for RejectingReceiver {
    fn receive(&mut self, _pool: &mut EthPool, to: Address, amount: Amount) -> EthPoolResult<()> {
        Err(EthPoolError::TransferFailed { to, amount })
    }
}

/// Native balances of every address, including the pool's custody
#[derive(Debug, Clone)]
pub struct Wallets {
    balances: HashMap<Address, Amount>,
    /// Address holding the pooled value
    custodian: Address,
    /// Addresses that refuse incoming payouts
    rejecting: Vec<Address>,
}

impl Wallets {
    pub fn new(custodian: Address) -> Self {
        Self {
            balances: HashMap::new(),
            custodian,
            rejecting: Vec::new(),
        }
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// Credit `amount` out of thin air
    pub fn fund(&mut self, who: Address, amount: Amount) -> EthPoolResult<()> {
        let balance = self.balances.entry(who).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(EthPoolError::Overflow)?;
        Ok(())
    }

    pub fn balance_of(&self, who: &Address) -> Amount {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Value held by the custodian
    pub fn custody(&self) -> Amount {
        self.balance_of(&self.custodian)
    }

    /// Make `who` refuse payouts from the custodian
    pub fn reject_payouts(&mut self, who: Address) {
        if !self.rejecting.contains(&who) {
            self.rejecting.push(who);
        }
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> EthPoolResult<()> {
        let available = self.balance_of(&from);
        if available < amount {
            return Err(EthPoolError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self.balance_of(&to)
            .checked_add(amount)
            .ok_or(EthPoolError::Overflow)?;

        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl ValueReceiver for Wallets {
    fn receive(&mut self, _pool: &mut EthPool, to: Address, amount: Amount) -> EthPoolResult<()> {
        if self.rejecting.contains(&to) {
            return Err(EthPoolError::TransferFailed { to, amount });
        }
        self.transfer(self.custodian, to, amount)
    }
}
