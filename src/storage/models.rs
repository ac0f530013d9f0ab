//! Data models for the derivation index store

use serde::{Deserialize, Serialize};

/// Primary key of the singleton `wallet_state` row
pub const WALLET_STATE_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletState {
    /// Next index to allocate; equals the number of indices handed out so far
    pub derivation_index: u32,
}
