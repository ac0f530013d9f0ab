use anyhow::Context;
use std::sync::Arc;
use watch_wallet::api::server;
use watch_wallet::bitcoin::{BitcoinRpcClient, ChainQueryService};
use watch_wallet::storage::IndexAllocator;
use watch_wallet::wallet::{AddressManager, WatchWalletManager};
use watch_wallet::WalletConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting watch-only wallet server...");

    let config = WalletConfig::from_env().context("Failed to load configuration")?;

    let addresses =
        AddressManager::from_xpub_str(&config.xpub, config.bitcoin_network, config.address_kind)
            .context("Failed to initialize address derivation")?;

    let allocator = IndexAllocator::open(&config.database_path)
        .context("Failed to open derivation index store")?;

    // Node may still be starting; connect retries block, so keep them off the runtime
    let rpc_config = config.rpc.clone();
    let rpc_client = tokio::task::spawn_blocking(move || BitcoinRpcClient::connect(&rpc_config))
        .await?
        .context("Failed to connect to Bitcoin Core")?;
    log::info!("Using node wallet '{}'", rpc_client.wallet_name());

    let chain: Arc<dyn ChainQueryService> = Arc::new(rpc_client);
    let manager = Arc::new(WatchWalletManager::new(addresses, allocator, chain));
    manager.start().context("Failed to start wallet")?;

    server::start_server(
        &config.bind_address,
        manager,
        config.allowed_origins.as_deref(),
    )
    .await?;
    Ok(())
}
