//! Manually entered tokens: on-chain metadata lookup over a chain RPC
//! and the session-scoped book of entries queued for sweeping.

use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use tracing::{debug, info};

use crate::bindings::IERC20;
use crate::chains;

/// User-facing lookup failure. The cause is attached for logs but the
/// display form stays generic on purpose; RPC errors are rarely useful
/// to an end user typing an address.
#[derive(Debug, thiserror::Error)]
#[error("Cannot find token. Please check chain ID and token address.")]
pub struct TokenLookupError {
    #[source]
    source: alloy::contract::Error,
}

/// A token added by address rather than discovered through the balance
/// index. The balance is the atomic on-chain reading at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTokenEntry {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub balance: U256,
    pub is_supported_chain: bool,
}

impl ManualTokenEntry {
    pub fn is_native(&self) -> bool {
        chains::is_native_sentinel(self.chain_id, self.address)
    }

    /// Entries with nothing to move or on a chain the relay cannot reach
    /// are kept in the book but excluded from sweeps.
    pub fn is_sweepable(&self) -> bool {
        self.balance > U256::ZERO && self.is_supported_chain
    }
}

/// Reads ERC-20 metadata and the smart account's balance for a manually
/// entered address. Any failed contract read maps to `TokenLookupError`.
pub async fn lookup_token<P: Provider>(
    provider: P,
    chain_id: u64,
    token: Address,
    holder: Address,
) -> Result<ManualTokenEntry, TokenLookupError> {
    let erc20 = IERC20::new(token, provider);

    let symbol = erc20
        .symbol()
        .call()
        .await
        .map_err(|source| TokenLookupError { source })?;
    let name = erc20
        .name()
        .call()
        .await
        .map_err(|source| TokenLookupError { source })?;
    let decimals = erc20
        .decimals()
        .call()
        .await
        .map_err(|source| TokenLookupError { source })?;
    let balance = erc20
        .balanceOf(holder)
        .call()
        .await
        .map_err(|source| TokenLookupError { source })?;

    info!(%token, chain_id, symbol, "Looked up manual token");

    Ok(ManualTokenEntry {
        chain_id,
        address: token,
        symbol,
        name,
        decimals,
        balance,
        is_supported_chain: chains::is_supported(chain_id),
    })
}

/// The session list of manually entered tokens. Cleared after a
/// successful sweep; never persisted.
#[derive(Debug, Default)]
pub struct ManualTokenBook {
    entries: Vec<ManualTokenEntry>,
}

impl ManualTokenBook {
    /// Adds an entry unless the same (chain, address) pair is already
    /// present. Returns whether the entry was added.
    pub fn add(&mut self, entry: ManualTokenEntry) -> bool {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.chain_id == entry.chain_id && e.address == entry.address);
        if duplicate {
            debug!(address = %entry.address, chain_id = entry.chain_id, "Manual token already added");
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, chain_id: u64, address: Address) {
        self.entries
            .retain(|e| !(e.chain_id == chain_id && e.address == address));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ManualTokenEntry] {
        &self.entries
    }

    /// Entries eligible for the sweep batch.
    pub fn sweepable(&self) -> Vec<&ManualTokenEntry> {
        self.entries.iter().filter(|e| e.is_sweepable()).collect()
    }
}
