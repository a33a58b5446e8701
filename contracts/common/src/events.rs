//! Pool Events for ETHPool
//!
//! Events are emitted by every successful operation and can be indexed
//! off-chain for balances, analytics and notifications. Failed operations
//! emit nothing.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Amount, Shares};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Lifecycle Events (0x01 - 0x1F)
    PoolCreated = 0x01,

    // Share Events (0x20 - 0x3F)
    Deposited = 0x20,
    Withdrawn = 0x21,

    // Reward Events (0x40 - 0x5F)
    RewardsDistributed = 0x40,
}

/// Main event enum containing all pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum EthPoolEvent {
    /// Emitted once when the pool is constructed
    PoolCreated {
        team: Address,
        block_height: u64,
    },

    /// Emitted when value is deposited and shares minted
    Deposited {
        depositor: Address,
        amount: Amount,
        shares_minted: Shares,
        total_shares: Shares,
        total_value: Amount,
        block_height: u64,
    },

    /// Emitted when the team injects rewards
    RewardsDistributed {
        team: Address,
        amount: Amount,
        total_shares: Shares,
        total_value: Amount,
        block_height: u64,
    },

    /// Emitted when a holder burns all shares and is paid out
    Withdrawn {
        depositor: Address,
        shares_burned: Shares,
        payout: Amount,
        total_shares: Shares,
        total_value: Amount,
        block_height: u64,
    },
}

impl EthPoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PoolCreated { .. } => EventType::PoolCreated,
            Self::Deposited { .. } => EventType::Deposited,
            Self::RewardsDistributed { .. } => EventType::RewardsDistributed,
            Self::Withdrawn { .. } => EventType::Withdrawn,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::PoolCreated { block_height, .. } => *block_height,
            Self::Deposited { block_height, .. } => *block_height,
            Self::RewardsDistributed { block_height, .. } => *block_height,
            Self::Withdrawn { block_height, .. } => *block_height,
        }
    }

    /// Account the event concerns, if any
    pub fn subject(&self) -> Address {
        match self {
            Self::PoolCreated { team, .. } => *team,
            Self::Deposited { depositor, .. } => *depositor,
            Self::RewardsDistributed { team, .. } => *team,
            Self::Withdrawn { depositor, .. } => *depositor,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EthPoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: EthPoolEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[EthPoolEvent] {
        &self.events
    }

    /// Most recent event
    pub fn last(&self) -> Option<&EthPoolEvent> {
        self.events.last()
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<EthPoolEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&EthPoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop every event after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}
