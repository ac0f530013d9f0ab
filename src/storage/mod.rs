//! Storage and persistence layer
//!
//! - SQLite-backed derivation index allocator
//! - Data models

mod index_store;
mod models;

pub use index_store::IndexAllocator;
pub use models::{WalletState, WALLET_STATE_ID};
