//! Access Control Module
//!
//! The pool has exactly one privileged role: the team, the only identity
//! allowed to distribute rewards. Every other operation is open to anyone.
//! Checks are stateless and run before any state is touched.

use crate::{EthPoolError, EthPoolResult};
use crate::types::{Address, EthPoolConfig, PoolAction};

/// Pool roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Reward distributor configured at construction
    Team,
    /// Any other caller
    Depositor,
}

/// Permission types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Deposit value
    Deposit,
    /// Withdraw own holding
    Withdraw,
    /// Inject rewards
    DistributeRewards,
}

impl Permission {
    /// Get minimum role required for this permission
    pub fn min_role(&self) -> Role {
        match self {
            Permission::DistributeRewards => Role::Team,
            Permission::Deposit | Permission::Withdraw => Role::Depositor,
        }
    }

    /// Permission an action needs
    pub fn for_action(action: &PoolAction) -> Self {
        match action {
            PoolAction::Deposit { .. } => Permission::Deposit,
            PoolAction::DistributeRewards { .. } => Permission::DistributeRewards,
            PoolAction::Withdraw => Permission::Withdraw,
        }
    }
}

/// Resolve the role of a caller
pub fn role_of(config: &EthPoolConfig, caller: &Address) -> Role {
    if *caller == config.team {
        Role::Team
    } else {
        Role::Depositor
    }
}

/// Check if caller has permission for action
pub fn has_permission(config: &EthPoolConfig, caller: &Address, permission: Permission) -> bool {
    match permission.min_role() {
        Role::Team => role_of(config, caller) == Role::Team,
        Role::Depositor => true,
    }
}

/// Fail with `Unauthorized` unless the caller is the team
pub fn require_team(config: &EthPoolConfig, caller: &Address) -> EthPoolResult<()> {
    if !has_permission(config, caller, Permission::DistributeRewards) {
        return Err(EthPoolError::Unauthorized {
            expected: config.team,
            actual: *caller,
        });
    }
    Ok(())
}

/// Fail with `Unauthorized` unless the caller may perform the action
pub fn authorize(config: &EthPoolConfig, caller: &Address, action: &PoolAction) -> EthPoolResult<()> {
    match Permission::for_action(action).min_role() {
        Role::Team => require_team(config, caller),
        Role::Depositor => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Address {
        [7u8; 32]
    }

    fn config() -> EthPoolConfig {
        EthPoolConfig::new(team())
    }

    #[test]
    fn test_role_of() {
        assert_eq!(role_of(&config(), &team()), Role::Team);
        assert_eq!(role_of(&config(), &[1u8; 32]), Role::Depositor);
    }

    #[test]
    fn test_team_passes_guard() {
        assert!(require_team(&config(), &team()).is_ok());
    }

    #[test]
    fn test_non_team_rejected() {
        let outsider = [3u8; 32];
        let err = require_team(&config(), &outsider).unwrap_err();

        assert_eq!(err, EthPoolError::Unauthorized { expected: team(), actual: outsider });
        assert_eq!(err.message(), "caller is not the team");
    }

    #[test]
    fn test_open_permissions() {
        let outsider = [3u8; 32];
        assert!(authorize(&config(), &outsider, &PoolAction::Deposit { amount: 1 }).is_ok());
        assert!(authorize(&config(), &outsider, &PoolAction::Withdraw).is_ok());
        assert!(authorize(&config(), &outsider, &PoolAction::DistributeRewards { amount: 1 }).is_err());
        // The team may deposit like anyone else
        assert!(authorize(&config(), &team(), &PoolAction::Deposit { amount: 1 }).is_ok());
    }
}
