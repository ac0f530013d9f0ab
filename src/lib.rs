//! Watch-only Bitcoin wallet service
//!
//! Derives receive addresses from a single extended public key, registers
//! each one as watch-only with a Bitcoin Core node, and reports the node's
//! view of balance and unspent outputs. No private keys ever touch this
//! process.
//!
//! # Architecture
//!
//! - **AddressManager**: pure `<xpub>/0/<index>` derivation
//! - **IndexAllocator**: SQLite-backed counter, each index handed out once
//! - **WatchRegistrar**: `getdescriptorinfo` + `importdescriptors` for `addr(...)`
//! - **BalanceAggregator**: `getbalance` / `listunspent` pass-through
//! - **WatchWalletManager**: composes the above for the HTTP layer

pub mod api;
pub mod bitcoin;
pub mod config;
pub mod error;
pub mod storage;
pub mod wallet;

pub use config::WalletConfig;
pub use error::WalletError;
pub use wallet::{IssuedAddress, WatchWalletManager};
