/// Balance and UTXO queries
///
/// Straight pass-through to the node for every watched source. Nothing is
/// cached; each call reflects the node's view at call time.

use bitcoin::Amount;
use std::sync::Arc;

use crate::bitcoin::{ChainError, ChainQueryService, Utxo};
use crate::error::QueryError;

pub struct BalanceAggregator {
    chain: Arc<dyn ChainQueryService>,
}

impl BalanceAggregator {
    pub fn new(chain: Arc<dyn ChainQueryService>) -> Self {
        Self { chain }
    }

    pub fn balance(&self) -> Result<Amount, QueryError> {
        let balance = self.chain.balance().map_err(query_error)?;
        log::debug!("Watched balance: {} sats", balance.to_sat());
        Ok(balance)
    }

    /// Unspent outputs, most-confirmed first, then by outpoint
    pub fn utxos(&self) -> Result<Vec<Utxo>, QueryError> {
        let mut utxos = self.chain.list_unspent().map_err(query_error)?;
        utxos.sort_by(|a, b| {
            b.confirmations
                .cmp(&a.confirmations)
                .then_with(|| a.txid.cmp(&b.txid))
                .then_with(|| a.vout.cmp(&b.vout))
        });
        log::debug!("Watched UTXO count: {}", utxos.len());
        Ok(utxos)
    }
}

fn query_error(err: ChainError) -> QueryError {
    match err {
        ChainError::Unreachable(reason) => QueryError::Unreachable(reason),
        ChainError::Rejected(reason) => QueryError::Rejected(reason),
        ChainError::InvalidResponse(reason) => QueryError::InvalidResponse(reason),
    }
}
