//! Capability seam between the wallet core and the node that indexes the chain.
//!
//! `BitcoinRpcClient` implements this against Bitcoin Core; tests plug in a
//! double that can simulate deposits and outages.

use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The request never got an answer (connection refused, timeout, ...)
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The node answered with an RPC error
    #[error("rejected: {0}")]
    Rejected(String),

    /// The node answered with something we could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Unspent output as reported by the node, amounts in satoshis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub address: Option<String>,
    pub amount_sats: u64,
    pub confirmations: u32,
    pub spendable: bool,
    pub label: Option<String>,
}

/// Result of `getdescriptorinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorInfo {
    /// Canonical descriptor including its `#checksum` suffix
    pub descriptor: String,
    pub checksum: String,
}

/// Per-descriptor outcome of `importdescriptors`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub error: Option<ImportFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportFailure {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Node operations the watch wallet relies on. All queries are scoped to
/// every source the node-side wallet is watching.
pub trait ChainQueryService: Send + Sync {
    /// Total balance across watched addresses, unconfirmed included
    fn balance(&self) -> Result<Amount, ChainError>;

    fn list_unspent(&self) -> Result<Vec<Utxo>, ChainError>;

    fn descriptor_info(&self, descriptor: &str) -> Result<DescriptorInfo, ChainError>;

    /// Import a checksummed descriptor as watch-only, tracking from now on
    /// without a rescan.
    fn import_descriptor(&self, descriptor: &str) -> Result<ImportResult, ChainError>;
}
