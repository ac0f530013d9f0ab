//! Bitcoin Core RPC client wrapper
//!
//! Talks to a single watch-only wallet on the node (`/wallet/<name>`).
//! Startup uses anyhow; the `ChainQueryService` methods classify failures
//! into `ChainError` so callers can tell outages from rejections.

use anyhow::{Context, Result};
use bitcoin::Amount;
use bitcoincore_rpc::{jsonrpc, Auth, Client, RpcApi};
use serde::Deserialize;
use serde_json::json;
use std::thread;
use std::time::Duration;

use super::chain::{ChainError, ChainQueryService, DescriptorInfo, ImportResult, Utxo};
use crate::config::RpcConfig;

const MAX_CONFIRMATIONS: usize = 9_999_999;

pub struct BitcoinRpcClient {
    client: Client,
    wallet_name: String,
}

#[derive(Debug, Deserialize)]
struct DescriptorInfoResponse {
    descriptor: String,
    #[serde(default)]
    checksum: Option<String>,
}

impl BitcoinRpcClient {
    /// Connect to the node, waiting for it to come up, then make sure the
    /// watch-only wallet exists and is loaded.
    pub fn connect(config: &RpcConfig) -> Result<Self> {
        let root = Client::new(&config.url, auth(config))
            .context("Failed to create Bitcoin RPC client")?;

        wait_for_node(&root, config.connect_attempts, config.connect_delay)?;
        log::info!("Connected to Bitcoin Core at {}", config.url);

        ensure_wallet(&root, &config.wallet_name);

        let wallet_url = format!("{}/wallet/{}", config.url, config.wallet_name);
        let client = Client::new(&wallet_url, auth(config))
            .context("Failed to create wallet RPC client")?;

        Ok(Self {
            client,
            wallet_name: config.wallet_name.clone(),
        })
    }

    pub fn wallet_name(&self) -> &str {
        &self.wallet_name
    }
}

fn auth(config: &RpcConfig) -> Auth {
    Auth::UserPass(config.user.clone(), config.password.clone())
}

/// Probe `getblockchaininfo` until it answers or attempts run out
fn wait_for_node(client: &Client, attempts: u32, delay: Duration) -> Result<()> {
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match client.get_blockchain_info() {
            Ok(info) => {
                log::debug!("Node chain: {}, blocks: {}", info.chain, info.blocks);
                return Ok(());
            }
            Err(e) => {
                log::warn!(
                    "Bitcoin Core not reachable (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                last_err = Some(e);
                if attempt < attempts {
                    thread::sleep(delay);
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "could not reach Bitcoin Core after {} attempts: {}",
        attempts,
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Create the wallet with private keys disabled, or load it if it already exists
fn ensure_wallet(client: &Client, name: &str) {
    match client.create_wallet(name, Some(true), None, None, None) {
        Ok(_) => log::info!("Created watch-only wallet '{}'", name),
        Err(create_err) => {
            log::debug!("createwallet '{}' failed: {}", name, create_err);
            match client.load_wallet(name) {
                Ok(_) => log::info!("Loaded watch-only wallet '{}'", name),
                Err(load_err) => {
                    log::warn!(
                        "Wallet '{}' might already be loaded or failed to load: {}",
                        name,
                        load_err
                    );
                }
            }
        }
    }
}

fn classify(err: bitcoincore_rpc::Error) -> ChainError {
    match err {
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(rpc)) => {
            ChainError::Rejected(format!("{} (code {})", rpc.message, rpc.code))
        }
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Transport(e)) => {
            ChainError::Unreachable(e.to_string())
        }
        bitcoincore_rpc::Error::Io(e) => ChainError::Unreachable(e.to_string()),
        other => ChainError::InvalidResponse(other.to_string()),
    }
}

impl ChainQueryService for BitcoinRpcClient {
    fn balance(&self) -> Result<Amount, ChainError> {
        self.client
            .get_balance(Some(0), Some(true))
            .map_err(classify)
    }

    fn list_unspent(&self) -> Result<Vec<Utxo>, ChainError> {
        let entries = self
            .client
            .list_unspent(Some(0), Some(MAX_CONFIRMATIONS), None, None, None)
            .map_err(classify)?;

        Ok(entries
            .into_iter()
            .map(|entry| Utxo {
                txid: entry.txid.to_string(),
                vout: entry.vout,
                address: entry.address.map(|a| a.assume_checked().to_string()),
                amount_sats: entry.amount.to_sat(),
                confirmations: entry.confirmations,
                spendable: entry.spendable,
                label: entry.label,
            })
            .collect())
    }

    fn descriptor_info(&self, descriptor: &str) -> Result<DescriptorInfo, ChainError> {
        let info: DescriptorInfoResponse = self
            .client
            .call("getdescriptorinfo", &[json!(descriptor)])
            .map_err(classify)?;

        let checksum = match info.checksum {
            Some(checksum) => checksum,
            None => info
                .descriptor
                .rsplit_once('#')
                .map(|(_, checksum)| checksum.to_string())
                .ok_or_else(|| {
                    ChainError::InvalidResponse(format!(
                        "descriptor without checksum: {}",
                        info.descriptor
                    ))
                })?,
        };

        Ok(DescriptorInfo {
            descriptor: info.descriptor,
            checksum,
        })
    }

    fn import_descriptor(&self, descriptor: &str) -> Result<ImportResult, ChainError> {
        let request = json!([{
            "desc": descriptor,
            "timestamp": "now",
        }]);

        let mut results: Vec<ImportResult> = self
            .client
            .call("importdescriptors", &[request])
            .map_err(classify)?;

        if results.len() != 1 {
            return Err(ChainError::InvalidResponse(format!(
                "expected one import result, got {}",
                results.len()
            )));
        }

        Ok(results.remove(0))
    }
}
