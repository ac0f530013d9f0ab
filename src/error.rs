use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure to turn an index into an address. Fatal to the call only.
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Index {0} is outside the non-hardened range")]
    IndexOutOfRange(u32),

    #[error("BIP32 derivation failed: {0}")]
    Bip32(#[from] bitcoin::bip32::Error),

    #[error("Invalid extended public key: {0}")]
    InvalidXpub(String),

    #[error("Extended public key is for {xpub:?} but wallet network is {configured}")]
    NetworkMismatch {
        xpub: bitcoin::NetworkKind,
        configured: bitcoin::Network,
    },
}

/// The persisted derivation counter could not be read or advanced.
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wallet state row is missing")]
    MissingState,

    #[error("Derivation index changed underneath allocation (expected {expected})")]
    Conflict { expected: u32 },

    #[error("Derivation index {0} is out of range")]
    Exhausted(i64),

    #[error("Index store lock poisoned")]
    LockPoisoned,
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Chain service unreachable while registering {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("Chain service rejected descriptor for {address}: {reason}")]
    Rejected { address: String, reason: String },

    #[error("Chain service sent an invalid response while registering {address}: {reason}")]
    InvalidResponse { address: String, reason: String },
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Chain service unreachable: {0}")]
    Unreachable(String),

    #[error("Chain service returned an error: {0}")]
    Rejected(String),

    #[error("Chain service sent an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let status = match self {
            WalletError::Allocation(_) => StatusCode::SERVICE_UNAVAILABLE,
            WalletError::Registration(_) | WalletError::Query(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
