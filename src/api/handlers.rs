use axum::{extract::State, Json};
use std::sync::Arc;

use super::types::{BalanceResponse, NewAddressResponse, UtxosResponse};
use crate::error::WalletError;
use crate::wallet::WatchWalletManager;

/// Shared application state
pub type AppState = Arc<WatchWalletManager>;

/// Run a coordinator call on the blocking pool; the node client and the
/// SQLite store are both synchronous.
async fn run_blocking<T, F>(manager: AppState, op: F) -> Result<T, WalletError>
where
    F: FnOnce(&WatchWalletManager) -> Result<T, WalletError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&manager))
        .await
        .map_err(|e| WalletError::Internal(format!("wallet worker failed: {}", e)))?
}

/// GET /address
/// Issues a fresh, registered receive address
pub async fn new_address_handler(
    State(manager): State<AppState>,
) -> Result<Json<NewAddressResponse>, WalletError> {
    let issued = run_blocking(manager, |m| m.new_address())
        .await
        .map_err(|e| {
            log::error!("Error generating address: {}", e);
            e
        })?;

    Ok(Json(NewAddressResponse {
        address: issued.address,
        index: issued.index,
    }))
}

/// GET /balance
pub async fn balance_handler(
    State(manager): State<AppState>,
) -> Result<Json<BalanceResponse>, WalletError> {
    let balance = run_blocking(manager, |m| m.balance()).await.map_err(|e| {
        log::error!("Error getting balance: {}", e);
        e
    })?;

    Ok(Json(BalanceResponse {
        balance: balance.to_btc(),
        balance_sats: balance.to_sat(),
    }))
}

/// GET /utxos
pub async fn utxos_handler(
    State(manager): State<AppState>,
) -> Result<Json<UtxosResponse>, WalletError> {
    let utxos = run_blocking(manager, |m| m.utxos()).await.map_err(|e| {
        log::error!("Error getting UTXOs: {}", e);
        e
    })?;

    Ok(Json(UtxosResponse { utxos }))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
