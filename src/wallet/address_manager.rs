use bitcoin::bip32::{ChildNumber, Xpub};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{Secp256k1, VerifyOnly};
use bitcoin::{Address, Network, NetworkKind};
use std::fmt;
use std::str::FromStr;

use crate::error::DerivationError;

/// External (receive) chain under the root key
const EXTERNAL_CHAIN: u32 = 0;

/// Script type used to encode derived public keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKind {
    #[default]
    P2wpkh,
    P2pkh,
}

impl FromStr for AddressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p2wpkh" | "wpkh" | "segwit" => Ok(AddressKind::P2wpkh),
            "p2pkh" | "pkh" | "legacy" => Ok(AddressKind::P2pkh),
            other => Err(format!("unknown address type '{}'", other)),
        }
    }
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKind::P2wpkh => write!(f, "p2wpkh"),
            AddressKind::P2pkh => write!(f, "p2pkh"),
        }
    }
}

/// Derives receive addresses at `<xpub>/0/<index>`.
///
/// Pure: holds only the immutable root key, so it is safe to share across
/// threads and to call repeatedly with the same index.
pub struct AddressManager {
    xpub: Xpub,
    network: Network,
    kind: AddressKind,
    secp: Secp256k1<VerifyOnly>,
}

impl AddressManager {
    pub fn new(xpub: Xpub, network: Network, kind: AddressKind) -> Result<Self, DerivationError> {
        if xpub.network != NetworkKind::from(network) {
            return Err(DerivationError::NetworkMismatch {
                xpub: xpub.network,
                configured: network,
            });
        }

        Ok(Self {
            xpub,
            network,
            kind,
            secp: Secp256k1::verification_only(),
        })
    }

    /// Parse the xpub/tpub string from configuration
    pub fn from_xpub_str(
        xpub: &str,
        network: Network,
        kind: AddressKind,
    ) -> Result<Self, DerivationError> {
        let xpub = Xpub::from_str(xpub.trim())
            .map_err(|e| DerivationError::InvalidXpub(e.to_string()))?;
        Self::new(xpub, network, kind)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Derive the receive address at the specified index
    pub fn derive_address(&self, index: u32) -> Result<Address, DerivationError> {
        let external_child = ChildNumber::from_normal_idx(EXTERNAL_CHAIN)?;
        let child_number = ChildNumber::from_normal_idx(index)
            .map_err(|_| DerivationError::IndexOutOfRange(index))?;

        let derived_key = self
            .xpub
            .derive_pub(&self.secp, &[external_child, child_number])?;

        let compressed = CompressedPublicKey(derived_key.public_key);
        let address = match self.kind {
            AddressKind::P2wpkh => Address::p2wpkh(&compressed, self.network),
            AddressKind::P2pkh => Address::p2pkh(compressed.pubkey_hash(), self.network),
        };

        Ok(address)
    }

    /// Derive `count` consecutive addresses, returning (index, address) pairs
    pub fn derive_addresses(
        &self,
        start: u32,
        count: u32,
    ) -> Result<Vec<(u32, Address)>, DerivationError> {
        let mut addresses = Vec::with_capacity(count as usize);

        for i in 0..count {
            let index = start
                .checked_add(i)
                .ok_or(DerivationError::IndexOutOfRange(u32::MAX))?;
            let address = self.derive_address(index)?;
            addresses.push((index, address));
        }

        Ok(addresses)
    }
}
