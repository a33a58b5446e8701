//! Deployment
//!
//! Creates a pool for a team, gives it a deterministic address and publishes
//! that address to `publish/<network>.json` for clients to pick up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ethpool_common::constants::deployment::{ADDRESS_DOMAIN, PUBLISH_DIR};
use ethpool_common::errors::{DeploymentStage, EthPoolError, EthPoolResult};
use ethpool_common::types::Address;

use crate::EthPool;

/// Derive the pool address from the team identity and the deployer nonce
pub fn derive_pool_address(team: &Address, nonce: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(ADDRESS_DOMAIN);
    hasher.update(team);
    hasher.update(nonce.to_le_bytes());
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Published location of a deployed pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// 0x-prefixed hex address
    #[serde(rename = "ethPool")]
    pub eth_pool: String,
}

impl DeploymentRecord {
    pub fn new(address: &Address) -> Self {
        Self {
            eth_pool: format!("0x{}", hex::encode(address)),
        }
    }

    /// Decode the recorded address
    pub fn address(&self) -> EthPoolResult<Address> {
        parse_address(&self.eth_pool)
    }
}

/// Parse a 32-byte hex address, with or without the `0x` prefix
pub fn parse_address(text: &str) -> EthPoolResult<Address> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).map_err(|_| decode_failed())?;
    bytes.try_into().map_err(|_| decode_failed())
}

fn decode_failed() -> EthPoolError {
    EthPoolError::DeploymentFailed { stage: DeploymentStage::Decode }
}

/// Construct a pool for `team` and return it with its address
pub fn deploy(team: Address, nonce: u64, block_height: u64) -> (EthPool, Address) {
    let pool = EthPool::with_block_height(team, block_height);
    (pool, derive_pool_address(&team, nonce))
}

/// Path of the record for `network` under `root`
pub fn record_path(root: &Path, network: &str) -> PathBuf {
    root.join(PUBLISH_DIR).join(format!("{}.json", network))
}

/// Write the record for `network`, replacing any previous one
pub fn publish(root: &Path, network: &str, record: &DeploymentRecord) -> EthPoolResult<PathBuf> {
    let path = record_path(root, network);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|_| EthPoolError::DeploymentFailed { stage: DeploymentStage::CreateDir })?;
    }

    let json = serde_json::to_string_pretty(record)
        .map_err(|_| EthPoolError::DeploymentFailed { stage: DeploymentStage::Encode })?;
    fs::write(&path, json)
        .map_err(|_| EthPoolError::DeploymentFailed { stage: DeploymentStage::Write })?;

    Ok(path)
}

/// Read back the record for `network`
pub fn load_record(root: &Path, network: &str) -> EthPoolResult<DeploymentRecord> {
    let json = fs::read_to_string(record_path(root, network))
        .map_err(|_| EthPoolError::DeploymentFailed { stage: DeploymentStage::Read })?;
    serde_json::from_str(&json).map_err(|_| decode_failed())
}
