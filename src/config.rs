/// Service configuration from environment variables
///
/// Read once at startup. `XPUB` is the only value without a default;
/// everything else falls back to a local regtest setup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::bitcoin::parse_network;
use crate::error::ConfigError;
use crate::wallet::AddressKind;

#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// Node RPC endpoint, always with a scheme and without a trailing slash
    pub url: String,
    pub user: String,
    pub password: String,
    /// Node-side watch-only wallet name
    pub wallet_name: String,
    pub connect_attempts: u32,
    pub connect_delay: Duration,
}

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Extended public key (xpub/tpub) all receive addresses derive from
    pub xpub: String,
    pub bitcoin_network: bitcoin::Network,
    pub address_kind: AddressKind,
    pub rpc: RpcConfig,
    /// SQLite file holding the derivation index
    pub database_path: PathBuf,
    pub bind_address: String,
    /// CORS origins; `None` allows any origin
    pub allowed_origins: Option<Vec<String>>,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `XPUB`: extended public key (required)
    /// - `BITCOIN_NETWORK`: "regtest" (default), "signet", "testnet" or "bitcoin"
    /// - `ADDRESS_TYPE`: "p2wpkh" (default) or "p2pkh"
    /// - `BITCOIN_RPC_URL`, `BITCOIN_RPC_USER`, `BITCOIN_RPC_PASS`
    /// - `WALLET_NAME`, `DATABASE_PATH`, `BIND_ADDRESS`, `ALLOWED_ORIGINS`
    /// - `RPC_CONNECT_ATTEMPTS`, `RPC_CONNECT_DELAY_SECS`
    ///
    /// # Examples
    ///
    /// ```bash
    /// XPUB=tpub... BITCOIN_RPC_USER=user BITCOIN_RPC_PASS=pass cargo run
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let xpub = get("XPUB").ok_or(ConfigError::Missing("XPUB"))?.trim().to_string();

        let network_str = get("BITCOIN_NETWORK").unwrap_or_else(|| "regtest".to_string());
        let bitcoin_network =
            parse_network(&network_str).ok_or_else(|| ConfigError::Invalid {
                name: "BITCOIN_NETWORK",
                reason: format!("unknown network '{}'", network_str),
            })?;
        log::info!("Using {} network", bitcoin_network);

        let address_kind = match get("ADDRESS_TYPE") {
            Some(kind) => kind.parse().map_err(|reason| ConfigError::Invalid {
                name: "ADDRESS_TYPE",
                reason,
            })?,
            None => AddressKind::default(),
        };

        let url = normalize_rpc_url(
            &get("BITCOIN_RPC_URL").unwrap_or_else(|| "http://localhost:18443".to_string()),
        );
        let user = get("BITCOIN_RPC_USER").ok_or(ConfigError::Missing("BITCOIN_RPC_USER"))?;
        let password = get("BITCOIN_RPC_PASS").ok_or(ConfigError::Missing("BITCOIN_RPC_PASS"))?;
        let wallet_name = get("WALLET_NAME").unwrap_or_else(|| "watchwallet".to_string());

        let connect_attempts = parse_or(get("RPC_CONNECT_ATTEMPTS"), "RPC_CONNECT_ATTEMPTS", 30)?;
        let connect_delay_secs =
            parse_or(get("RPC_CONNECT_DELAY_SECS"), "RPC_CONNECT_DELAY_SECS", 2)?;

        let database_path = PathBuf::from(
            get("DATABASE_PATH").unwrap_or_else(|| "./wallet_state.sqlite".to_string()),
        );
        let bind_address = get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let allowed_origins = get("ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        log::info!("Bitcoin RPC URL: {}", url);

        Ok(Self {
            xpub,
            bitcoin_network,
            address_kind,
            rpc: RpcConfig {
                url,
                user,
                password,
                wallet_name,
                connect_attempts,
                connect_delay: Duration::from_secs(connect_delay_secs),
            },
            database_path,
            bind_address,
            allowed_origins,
        })
    }
}

/// Accept `host:port` as well as full URLs
fn normalize_rpc_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
