//! Protocol Constants
//!
//! All magic numbers and configuration values for the ETHPool contracts.

/// Native value units
pub mod value {
    /// Native unit name
    pub const SYMBOL: &str = "ETH";
    /// Decimal places of the native unit
    pub const DECIMALS: u8 = 18;
    /// One whole unit in base units (1 ETH = 10^18 wei)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Share pool parameters
pub mod pool {
    /// Price per share reported with this fixed-point precision (1e18)
    pub const PRICE_PRECISION: u128 = super::value::ONE;

    /// Shares minted per unit of value while the pool is empty (1:1)
    pub const BOOTSTRAP_SHARES_PER_UNIT: u128 = 1;
}

/// Deployment defaults
pub mod deployment {
    /// Directory deployment records are published to
    pub const PUBLISH_DIR: &str = "publish";

    /// Network name used when none is configured
    pub const DEFAULT_NETWORK: &str = "localhost";

    /// Key under which the pool address is recorded
    pub const POOL_RECORD_KEY: &str = "ethPool";

    /// Domain separator for pool address derivation
    pub const ADDRESS_DOMAIN: &[u8] = b"ETHPool";
}

/// Caller-facing error text; part of the external contract
pub mod messages {
    /// Withdraw by an account holding no shares (spelling preserved)
    pub const NO_WITHDRAWABLE_BALANCE: &str = "no withdrawl balance";

    /// Distribute called by anyone but the team
    pub const NOT_TEAM: &str = "caller is not the team";
}
