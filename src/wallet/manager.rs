use bitcoin::Amount;
use serde::Serialize;
use std::sync::Arc;

use super::address_manager::AddressManager;
use super::balance_ops::BalanceAggregator;
use super::watch_ops::WatchRegistrar;
use crate::bitcoin::{ChainQueryService, Utxo};
use crate::error::WalletError;
use crate::storage::IndexAllocator;

/// Address handed out by `new_address`, already registered with the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedAddress {
    pub index: u32,
    pub address: String,
}

/// Orchestrates address issuance and balance reads.
///
/// Safe to share across request workers: the allocator serializes counter
/// updates, everything else is stateless.
pub struct WatchWalletManager {
    addresses: AddressManager,
    allocator: IndexAllocator,
    registrar: WatchRegistrar,
    aggregator: BalanceAggregator,
}

impl WatchWalletManager {
    pub fn new(
        addresses: AddressManager,
        allocator: IndexAllocator,
        chain: Arc<dyn ChainQueryService>,
    ) -> Self {
        Self {
            addresses,
            allocator,
            registrar: WatchRegistrar::new(chain.clone()),
            aggregator: BalanceAggregator::new(chain),
        }
    }

    /// Startup hook. Nothing runs in the background.
    pub fn start(&self) -> Result<(), WalletError> {
        let next_index = self.allocator.current_index()?;
        log::info!(
            "Watch wallet started (network: {}, address type: {}, next index: {})",
            self.addresses.network(),
            self.addresses.kind(),
            next_index
        );
        Ok(())
    }

    /// Allocate → derive → register.
    ///
    /// The index is consumed by the allocation, so a derivation or
    /// registration failure burns it; the next call moves on to the next one.
    pub fn new_address(&self) -> Result<IssuedAddress, WalletError> {
        let index = self.allocator.allocate_next()?;

        let address = self.addresses.derive_address(index).map_err(|e| {
            log::warn!("Derivation index {} burned: {}", index, e);
            e
        })?;

        self.registrar.register(&address).map_err(|e| {
            log::warn!("Derivation index {} ({}) burned: {}", index, address, e);
            e
        })?;

        log::info!("Issued address {} at index {}", address, index);

        Ok(IssuedAddress {
            index,
            address: address.to_string(),
        })
    }

    pub fn balance(&self) -> Result<Amount, WalletError> {
        Ok(self.aggregator.balance()?)
    }

    pub fn utxos(&self) -> Result<Vec<Utxo>, WalletError> {
        Ok(self.aggregator.utxos()?)
    }

    /// Next index the allocator will hand out
    pub fn derivation_index(&self) -> Result<u32, WalletError> {
        Ok(self.allocator.current_index()?)
    }
}
