/// Wallet Core Module
///
/// - `address_manager.rs` - Receive address derivation from the xpub
/// - `watch_ops.rs` - Watch-only registration with the node
/// - `balance_ops.rs` - Balance and UTXO queries
/// - `manager.rs` - Orchestrator for all wallet operations

pub mod address_manager;
pub mod balance_ops;
pub mod manager;
pub mod watch_ops;

pub use address_manager::{AddressKind, AddressManager};
pub use balance_ops::BalanceAggregator;
pub use manager::{IssuedAddress, WatchWalletManager};
pub use watch_ops::WatchRegistrar;
