//! Common test utilities for watch wallet integration tests
//!
//! This module provides shared test infrastructure including:
//! - `MockChain`, an in-process stand-in for the Bitcoin Core watch wallet
//! - Test environment setup with a temporary SQLite store
//! - Deterministic regtest extended public keys
#![allow(dead_code)]

use bitcoin::bip32::{Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Amount, Network};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use watch_wallet::bitcoin::{ChainError, ChainQueryService, DescriptorInfo, ImportResult, Utxo};
use watch_wallet::storage::IndexAllocator;
use watch_wallet::wallet::{AddressKind, AddressManager, WatchWalletManager};

const MOCK_CHECKSUM: &str = "mockcsum";

/// Regtest xpub derived from a fixed seed
pub fn regtest_xpub(seed: u8) -> Xpub {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Regtest, &[seed; 32]).expect("valid seed");
    Xpub::from_priv(&secp, &master)
}

/// Watch-only wallet double.
///
/// Only addresses imported through `import_descriptor` are surfaced by
/// `balance` and `list_unspent`, the same way the node behaves.
#[derive(Default)]
pub struct MockChain {
    watched: Mutex<BTreeSet<String>>,
    outputs: Mutex<Vec<Utxo>>,
    import_failure: Mutex<Option<ChainError>>,
    offline: AtomicBool,
    import_calls: Mutex<Vec<String>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next import fail with `err`
    pub fn fail_next_import(&self, err: ChainError) {
        *self.import_failure.lock().unwrap() = Some(err);
    }

    /// Simulate the node going away (or coming back)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn watched(&self) -> BTreeSet<String> {
        self.watched.lock().unwrap().clone()
    }

    pub fn import_calls(&self) -> Vec<String> {
        self.import_calls.lock().unwrap().clone()
    }

    /// Record a payment of `sats` to `address` in a new mempool transaction
    pub fn deposit(&self, address: &str, sats: u64) -> String {
        let mut outputs = self.outputs.lock().unwrap();
        let txid = format!("{:064x}", outputs.len() + 1);
        outputs.push(Utxo {
            txid: txid.clone(),
            vout: 0,
            address: Some(address.to_string()),
            amount_sats: sats,
            confirmations: 0,
            spendable: false,
            label: Some(String::new()),
        });
        txid
    }

    /// Confirm every pending output by `blocks` more blocks
    pub fn mine(&self, blocks: u32) {
        for utxo in self.outputs.lock().unwrap().iter_mut() {
            utxo.confirmations += blocks;
        }
    }

    fn check_online(&self) -> Result<(), ChainError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChainError::Unreachable(
                "error sending request: connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn watched_outputs(&self) -> Vec<Utxo> {
        let watched = self.watched.lock().unwrap();
        self.outputs
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.address.as_ref().map_or(false, |a| watched.contains(a)))
            .cloned()
            .collect()
    }
}

impl ChainQueryService for MockChain {
    fn balance(&self) -> Result<Amount, ChainError> {
        self.check_online()?;
        let total = self.watched_outputs().iter().map(|u| u.amount_sats).sum();
        Ok(Amount::from_sat(total))
    }

    fn list_unspent(&self) -> Result<Vec<Utxo>, ChainError> {
        self.check_online()?;
        Ok(self.watched_outputs())
    }

    fn descriptor_info(&self, descriptor: &str) -> Result<DescriptorInfo, ChainError> {
        self.check_online()?;
        if !descriptor.starts_with("addr(") || !descriptor.ends_with(')') {
            return Err(ChainError::Rejected(format!(
                "'{}' is not a valid descriptor function (code -5)",
                descriptor
            )));
        }
        Ok(DescriptorInfo {
            descriptor: format!("{}#{}", descriptor, MOCK_CHECKSUM),
            checksum: MOCK_CHECKSUM.to_string(),
        })
    }

    fn import_descriptor(&self, descriptor: &str) -> Result<ImportResult, ChainError> {
        self.check_online()?;
        self.import_calls.lock().unwrap().push(descriptor.to_string());

        if let Some(err) = self.import_failure.lock().unwrap().take() {
            return Err(err);
        }

        let address = descriptor
            .strip_suffix(&format!("#{}", MOCK_CHECKSUM))
            .and_then(|d| d.strip_prefix("addr("))
            .and_then(|d| d.strip_suffix(')'))
            .ok_or_else(|| ChainError::Rejected("missing checksum (code -5)".to_string()))?;

        self.watched.lock().unwrap().insert(address.to_string());
        Ok(ImportResult {
            success: true,
            warnings: Vec::new(),
            error: None,
        })
    }
}

/// Test environment with a temporary index store and a mock node
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub chain: Arc<MockChain>,
    pub manager: Arc<WatchWalletManager>,
    pub xpub: Xpub,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        log::info!("Test directory: {:?}", temp_dir.path());

        let xpub = regtest_xpub(11);
        let chain = Arc::new(MockChain::new());
        let manager = Arc::new(build_manager(
            xpub,
            &temp_dir.path().join("wallet_state.sqlite"),
            chain.clone(),
        )?);

        Ok(Self {
            temp_dir,
            chain,
            manager,
            xpub,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("wallet_state.sqlite")
    }

    /// A second manager over the same store and node, as after a restart
    pub fn restart(&self) -> anyhow::Result<WatchWalletManager> {
        build_manager(self.xpub, &self.db_path(), self.chain.clone())
    }

    /// Independent deriver over the same xpub
    pub fn deriver(&self) -> AddressManager {
        AddressManager::new(self.xpub, Network::Regtest, AddressKind::P2wpkh)
            .expect("regtest xpub")
    }
}

fn build_manager(
    xpub: Xpub,
    db_path: &std::path::Path,
    chain: Arc<MockChain>,
) -> anyhow::Result<WatchWalletManager> {
    let addresses = AddressManager::new(xpub, Network::Regtest, AddressKind::P2wpkh)?;
    let allocator = IndexAllocator::open(db_path)?;
    Ok(WatchWalletManager::new(addresses, allocator, chain))
}
