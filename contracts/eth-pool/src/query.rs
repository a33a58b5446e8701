//! Read-only pool reports

use core::fmt;

use ethpool_common::constants::value::{DECIMALS, ONE, SYMBOL};
use ethpool_common::types::{Address, Amount, Shares};

use crate::EthPool;

/// Custody balance of the pool next to the balance its ledger tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub address: Address,
    /// Value held at the pool address, read without the pool
    pub custody_balance: Amount,
    /// `total_balance()` as reported by the pool
    pub tracked_balance: Amount,
}

impl PoolReport {
    pub fn new(address: Address, custody_balance: Amount, tracked_balance: Amount) -> Self {
        Self {
            address,
            custody_balance,
            tracked_balance,
        }
    }

    /// Value sent to the pool outside of deposits and distributions
    pub fn surplus(&self) -> Amount {
        self.custody_balance.saturating_sub(self.tracked_balance)
    }

    /// Custody covers everything the ledger owes
    pub fn is_solvent(&self) -> bool {
        self.custody_balance >= self.tracked_balance
    }
}

impl fmt::Display for PoolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "1. Total {} balance in the pool without contract interaction: {}",
            SYMBOL,
            format_units(self.custody_balance)
        )?;
        write!(
            f,
            "2. Total {} balance in the pool with contract interaction: {}",
            SYMBOL,
            format_units(self.tracked_balance)
        )
    }
}

/// One depositor's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserReport {
    pub account: Address,
    pub shares: Shares,
    pub balance: Amount,
}

impl UserReport {
    pub fn for_account(pool: &EthPool, account: Address) -> Self {
        Self {
            account,
            shares: pool.shares_of(&account),
            balance: pool.user_balance(&account),
        }
    }
}

impl fmt::Display for UserReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}: {} {} ({} shares)",
            hex::encode(self.account),
            format_units(self.balance),
            SYMBOL,
            self.shares
        )
    }
}

/// Render a base-unit amount as a decimal with trailing zeros trimmed
pub fn format_units(amount: Amount) -> String {
    let whole = amount / ONE;
    let fraction = amount % ONE;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(3 * ONE), "3");
        assert_eq!(format_units(ONE + ONE / 2), "1.5");
        assert_eq!(format_units(1), "0.000000000000000001");
    }

    #[test]
    fn test_report_lines() {
        let report = PoolReport::new([0u8; 32], 7 * ONE, 6 * ONE);
        let text = report.to_string();

        assert_eq!(
            text,
            "1. Total ETH balance in the pool without contract interaction: 7\n\
             2. Total ETH balance in the pool with contract interaction: 6"
        );
        assert_eq!(report.surplus(), ONE);
        assert!(report.is_solvent());
    }

    #[test]
    fn test_user_report() {
        let mut pool = EthPool::new([9u8; 32]);
        pool.deposit([1u8; 32], 2 * ONE).unwrap();

        let report = UserReport::for_account(&pool, [1u8; 32]);
        assert_eq!(report.balance, 2 * ONE);
        assert!(report.to_string().ends_with(": 2 ETH (2000000000000000000 shares)"));
    }
}
