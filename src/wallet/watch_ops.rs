/// Watch registration
///
/// Turns a freshly derived address into a watch-only `addr(...)` descriptor
/// on the node. The node is asked for the checksummed form first, then the
/// descriptor is imported with a "now" timestamp so no rescan happens.

use bitcoin::Address;
use std::sync::Arc;

use crate::bitcoin::{ChainError, ChainQueryService};
use crate::error::RegistrationError;

pub struct WatchRegistrar {
    chain: Arc<dyn ChainQueryService>,
}

impl WatchRegistrar {
    pub fn new(chain: Arc<dyn ChainQueryService>) -> Self {
        Self { chain }
    }

    /// Register `address` as watched, returning the descriptor that was imported
    pub fn register(&self, address: &Address) -> Result<String, RegistrationError> {
        let address_str = address.to_string();
        let raw_descriptor = format!("addr({})", address_str);

        let info = self
            .chain
            .descriptor_info(&raw_descriptor)
            .map_err(|e| registration_error(&address_str, e))?;
        log::debug!(
            "Descriptor for {}: {} (checksum {})",
            address_str,
            info.descriptor,
            info.checksum
        );

        let result = self
            .chain
            .import_descriptor(&info.descriptor)
            .map_err(|e| registration_error(&address_str, e))?;

        if !result.success {
            let reason = result
                .error
                .map(|e| format!("{} (code {})", e.message, e.code))
                .unwrap_or_else(|| "import reported failure".to_string());
            return Err(RegistrationError::Rejected {
                address: address_str,
                reason,
            });
        }

        for warning in &result.warnings {
            log::warn!("Import of {} returned warning: {}", info.descriptor, warning);
        }

        Ok(info.descriptor)
    }
}

fn registration_error(address: &str, err: ChainError) -> RegistrationError {
    let address = address.to_string();
    match err {
        ChainError::Unreachable(reason) => RegistrationError::Unreachable { address, reason },
        ChainError::Rejected(reason) => RegistrationError::Rejected { address, reason },
        ChainError::InvalidResponse(reason) => {
            RegistrationError::InvalidResponse { address, reason }
        }
    }
}
