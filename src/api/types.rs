use serde::{Deserialize, Serialize};

use crate::bitcoin::Utxo;

#[derive(Debug, Serialize, Deserialize)]
pub struct NewAddressResponse {
    pub address: String,
    pub index: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Balance in BTC
    pub balance: f64,
    pub balance_sats: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UtxosResponse {
    pub utxos: Vec<Utxo>,
}
