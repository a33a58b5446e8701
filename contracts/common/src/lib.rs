//! ETHPool Common Library
//!
//! Share accounting for a custodial pool that splits rewards among its
//! current depositors in proportion to their stake.
//!
//! ## How Rewards Reach Depositors Without Iteration
//!
//! Depositors hold **shares**, not value balances:
//! - **Deposit** mints shares at the current price per share
//! - **Distribute** raises the pool's value while the share count stays put,
//!   so every existing share is worth more in exact proportion
//! - **Withdraw** burns all of a holder's shares and pays out their value
//!
//! Every operation touches a constant number of fields no matter how many
//! depositors exist, and all arithmetic is integer-only with explicit floor
//! division (see [`math`]).
//!
//! ## Modules
//!
//! - **Constants**: Value units, precision and deployment defaults
//! - **Errors**: Typed error enum with stable codes and caller-facing text
//! - **Types**: Addresses, pool state, accounts and actions
//! - **Math**: 256-bit intermediate `mul_div_floor` and share conversions
//! - **Ledger**: The deposit / distribute / withdraw state transitions
//! - **Access Control**: Team-only guard for reward distribution
//! - **Events**: Structured event log for indexing
//!
//! This crate is `no_std` compatible when the `std` feature is disabled.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod ledger;
pub mod access_control;


// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use ledger::*;
pub use access_control::*;
