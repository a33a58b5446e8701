//! Randomized Operation Simulation
//!
//! Drives a hosted pool through a long seeded sequence of deposits,
//! distributions and withdrawals, checking the ledger after every step.
//!
//! ## Checked Invariants
//!
//! - **Share conservation**: account shares sum to `total_shares`
//! - **Value conservation**: `total_value` equals deposits plus rewards minus payouts
//! - **Custody match**: the pool address holds exactly `total_value`
//! - **Solvency**: holders are never owed more than the pool holds
//! - **Price monotonicity**: price per share never falls while shares exist
//! - **Failure isolation**: rejected operations leave the ledger untouched

use ethpool_common::constants::value::ONE;
use ethpool_common::errors::EthPoolResult;
use ethpool_common::types::{Address, Amount, PoolState};

use crate::host::Host;

// ============================================================================
// Constants
// ============================================================================

/// Maximum depositors to simulate
pub const MAX_SIMULATION_DEPOSITORS: u8 = 200;

/// Default number of operations
pub const DEFAULT_SIMULATION_STEPS: u64 = 500;

/// Seed for deterministic randomness
pub const DEFAULT_SEED: u64 = 42;

const TEAM: Address = [0xFF; 32];

// ============================================================================
// Types
// ============================================================================

/// Simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of depositors
    pub depositors: u8,
    /// Operations to run
    pub steps: u64,
    /// Largest single deposit or distribution
    pub max_amount: Amount,
    /// Random seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            depositors: 10,
            steps: DEFAULT_SIMULATION_STEPS,
            max_amount: 1_000 * ONE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Ledger properties checked after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantType {
    ShareConservation,
    ValueConservation,
    CustodyMatch,
    Solvency,
    PriceMonotonic,
    FailureIsolation,
    Exclusivity,
}

/// Invariant violation detected during simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Step where the violation occurred
    pub step: u64,
    pub invariant: InvariantType,
}

/// Operation tallies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub deposits: u64,
    pub distributions: u64,
    pub withdrawals: u64,
    /// Operations refused by the pool
    pub rejected: u64,
}

/// Result of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub final_state: PoolState,
    pub operations: OperationCounts,
    pub deposited: Amount,
    pub distributed: Amount,
    pub paid_out: Amount,
    pub invariant_violations: Vec<InvariantViolation>,
}

impl SimulationResult {
    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }
}

/// Deterministic linear congruential generator
#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound.max(1)
    }

    fn amount(&mut self, max: Amount) -> Amount {
        let wide = ((self.next_u64() as u128) << 64) | (self.next_u64() as u128);
        1 + wide % max.max(1)
    }
}

// ============================================================================
// Core Simulation Functions
// ============================================================================

/// Run a seeded simulation
///
/// Refusals the caller can recover from are counted; any other error aborts
/// the run.
pub fn run_simulation(config: &SimulationConfig) -> EthPoolResult<SimulationResult> {
    let depositors = generate_depositors(config);
    let mut host = Host::deploy(TEAM, config.seed);
    let budget = config.max_amount.saturating_mul(config.steps as u128 + 1);
    host.fund(TEAM, budget)?;
    for depositor in &depositors {
        host.fund(*depositor, budget)?;
    }

    let mut rng = Lcg::new(config.seed);
    let mut counts = OperationCounts::default();
    let mut violations = Vec::new();
    let mut deposited: Amount = 0;
    let mut distributed: Amount = 0;
    let mut paid_out: Amount = 0;
    let mut last_price = host.pool().price_per_share()?;

    for step in 0..config.steps {
        let before = host.pool().state();
        let who = depositors[rng.below(depositors.len() as u64) as usize];

        let outcome = match rng.below(10) {
            0..=4 => {
                let amount = rng.amount(config.max_amount);
                host.deposit(who, amount).map(|_| {
                    counts.deposits += 1;
                    deposited += amount;
                })
            }
            5 | 6 => {
                let amount = rng.amount(config.max_amount);
                host.distribute_rewards(TEAM, amount).map(|_| {
                    counts.distributions += 1;
                    distributed += amount;
                })
            }
            7 | 8 => host.withdraw(who).map(|result| {
                counts.withdrawals += 1;
                paid_out += result.payout;
            }),
            _ => {
                let amount = rng.amount(config.max_amount);
                if host.distribute_rewards(who, amount).is_ok() {
                    violations.push(InvariantViolation { step, invariant: InvariantType::Exclusivity });
                }
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                counts.rejected += 1;
                if host.pool().state() != before {
                    violations.push(InvariantViolation { step, invariant: InvariantType::FailureIsolation });
                }
            }
            Err(e) => return Err(e),
        }

        let state = host.pool().state();
        let expected_value = deposited
            .checked_add(distributed)
            .and_then(|v| v.checked_sub(paid_out));
        let observed = Observation {
            host: &host,
            depositors: &depositors,
            expected_value,
        };
        violations.extend(observed.check(step));

        if state.is_empty() {
            last_price = host.pool().price_per_share()?;
        } else {
            let price = host.pool().price_per_share()?;
            if price < last_price {
                violations.push(InvariantViolation { step, invariant: InvariantType::PriceMonotonic });
            }
            last_price = price;
        }
    }

    Ok(SimulationResult {
        final_state: host.pool().state(),
        operations: counts,
        deposited,
        distributed,
        paid_out,
        invariant_violations: violations,
    })
}

/// Addresses of the simulated depositors
fn generate_depositors(config: &SimulationConfig) -> Vec<Address> {
    let count = config.depositors.clamp(1, MAX_SIMULATION_DEPOSITORS);
    (1..=count).map(|i| [i; 32]).collect()
}

/// Pool as seen after one step
struct Observation<'a> {
    host: &'a Host,
    depositors: &'a [Address],
    expected_value: Option<Amount>,
}

impl Observation<'_> {
    fn check(&self, step: u64) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let pool = self.host.pool();
        let state = pool.state();

        if pool.check_invariants().is_err() {
            violations.push(InvariantViolation { step, invariant: InvariantType::ShareConservation });
        }

        if self.expected_value != Some(state.total_value) {
            violations.push(InvariantViolation { step, invariant: InvariantType::ValueConservation });
        }

        if self.host.wallets().custody() != state.total_value {
            violations.push(InvariantViolation { step, invariant: InvariantType::CustodyMatch });
        }

        let owed = self.depositors
            .iter()
            .try_fold(0u128, |sum, who| sum.checked_add(pool.user_balance(who)));
        if owed.map_or(true, |owed| owed > state.total_value) {
            violations.push(InvariantViolation { step, invariant: InvariantType::Solvency });
        }

        violations
    }
}

// ============================================================================
// Tests
// ============================================================================
