//! Bitcoin protocol plumbing
//!
//! - Chain query capability (`ChainQueryService`)
//! - Bitcoin Core RPC implementation
//! - Network name parsing

pub mod chain;
pub mod network;
pub mod rpc_client;

// Re-export main types
pub use chain::{ChainError, ChainQueryService, DescriptorInfo, ImportFailure, ImportResult, Utxo};
pub use network::parse_network;
pub use rpc_client::BitcoinRpcClient;
