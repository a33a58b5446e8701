//! Error Types for ETHPool
//!
//! Typed errors with stable codes for logging and the exact caller-facing
//! text that existing integrations match on.

use core::fmt;

use crate::constants::messages;
use crate::types::Address;

/// Result type alias for ETHPool operations
pub type EthPoolResult<T> = Result<T, EthPoolError>;

/// Main error enum for all ETHPool errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthPoolError {
    // ============ Authorization Errors ============
    /// Caller of a team-only operation is not the team
    Unauthorized { expected: Address, actual: Address },

    // ============ Balance Errors ============
    /// Withdraw by an account that holds no shares
    NoWithdrawableBalance { account: Address },

    /// Wallet cannot cover a transfer
    InsufficientBalance { available: u128, requested: u128 },

    // ============ Amount Errors ============
    /// Zero amount not allowed
    ZeroAmount,

    // ============ Pool Errors ============
    /// Rewards distributed while no shares exist
    NoStakeholders { amount: u128 },

    // ============ Transfer Errors ============
    /// Recipient refused the payout
    TransferFailed { to: Address, amount: u128 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ State Errors ============
    /// Ledger totals disagree with the accounts they summarize
    InvariantViolated { invariant: &'static str },

    // ============ Deployment Errors ============
    /// Publishing or reading a deployment record failed
    DeploymentFailed { stage: DeploymentStage },
}

/// Step of the deployment routine that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    /// Creating the publish directory
    CreateDir,
    /// Encoding the record
    Encode,
    /// Writing the record file
    Write,
    /// Reading the record file
    Read,
    /// Decoding the record
    Decode,
}

impl EthPoolError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "E020_UNAUTHORIZED",
            Self::NoWithdrawableBalance { .. } => "E011_NO_WITHDRAWABLE_BALANCE",
            Self::InsufficientBalance { .. } => "E012_INSUFFICIENT_BALANCE",
            Self::ZeroAmount => "E014_ZERO_AMOUNT",
            Self::NoStakeholders { .. } => "E050_NO_STAKEHOLDERS",
            Self::TransferFailed { .. } => "E070_TRANSFER_FAILED",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvariantViolated { .. } => "E101_INVARIANT_VIOLATED",
            Self::DeploymentFailed { .. } => "E110_DEPLOYMENT_FAILED",
        }
    }

    /// Caller-facing error text
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => messages::NOT_TEAM,
            Self::NoWithdrawableBalance { .. } => messages::NO_WITHDRAWABLE_BALANCE,
            Self::InsufficientBalance { .. } => "insufficient balance",
            Self::ZeroAmount => "amount must be greater than zero",
            Self::NoStakeholders { .. } => "no shares to receive rewards",
            Self::TransferFailed { .. } => "transfer failed",
            Self::Overflow => "arithmetic overflow",
            Self::Underflow => "arithmetic underflow",
            Self::DivisionByZero => "division by zero",
            Self::InvariantViolated { invariant } => *invariant,
            Self::DeploymentFailed { .. } => "deployment record unavailable",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Unauthorized { .. } => true,          // Retry as the team
            Self::NoWithdrawableBalance { .. } => true, // Deposit first
            Self::InsufficientBalance { .. } => true,   // Get more funds
            Self::ZeroAmount => true,                   // Attach value
            Self::NoStakeholders { .. } => true,        // Wait for a depositor
            Self::TransferFailed { .. } => true,        // Accept the payout
            _ => false,
        }
    }
}

impl fmt::Display for EthPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EthPoolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::string::ToString;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            EthPoolError::Unauthorized { expected: [1u8; 32], actual: [2u8; 32] },
            EthPoolError::NoWithdrawableBalance { account: [0u8; 32] },
            EthPoolError::InsufficientBalance { available: 0, requested: 1 },
            EthPoolError::ZeroAmount,
            EthPoolError::NoStakeholders { amount: 1 },
            EthPoolError::TransferFailed { to: [0u8; 32], amount: 1 },
            EthPoolError::Overflow,
            EthPoolError::Underflow,
            EthPoolError::DivisionByZero,
            EthPoolError::InvariantViolated { invariant: "x" },
            EthPoolError::DeploymentFailed { stage: DeploymentStage::Write },
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_display_uses_contract_text() {
        let not_team = EthPoolError::Unauthorized { expected: [1u8; 32], actual: [2u8; 32] };
        assert_eq!(not_team.to_string(), "caller is not the team");

        let empty = EthPoolError::NoWithdrawableBalance { account: [3u8; 32] };
        assert_eq!(empty.to_string(), "no withdrawl balance");
    }

    #[test]
    fn test_recoverability() {
        assert!(EthPoolError::ZeroAmount.is_recoverable());
        assert!(!EthPoolError::Overflow.is_recoverable());
        assert!(!EthPoolError::InvariantViolated { invariant: "x" }.is_recoverable());
    }
}
