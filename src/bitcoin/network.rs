//! Bitcoin network utility

use bitcoin::Network;

/// Parse a network name as accepted by `BITCOIN_NETWORK`
pub fn parse_network(name: &str) -> Option<Network> {
    match name.trim().to_lowercase().as_str() {
        "bitcoin" | "mainnet" | "main" => Some(Network::Bitcoin),
        "testnet" | "test" => Some(Network::Testnet),
        "signet" => Some(Network::Signet),
        "regtest" => Some(Network::Regtest),
        _ => None,
    }
}
