//! Connected-wallet capability: address, active chain, chain switching.
//! Signing itself happens through the execution relay, which holds the
//! signer transport.

use alloy::primitives::Address;
use async_trait::async_trait;

/// A wallet-mediated chain switch that did not complete.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to switch to chain {chain_id}: {message}")]
pub struct ChainSwitchError {
    pub chain_id: u64,
    pub message: String,
}

#[async_trait]
pub trait Signer: Send + Sync {
    /// The connected wallet (EOA) address; also the sweep destination.
    fn address(&self) -> Address;

    /// The chain the wallet is currently connected to.
    async fn active_chain_id(&self) -> u64;

    /// Asks the wallet to switch its active chain. Asynchronous and
    /// user-mediated; may be rejected.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainSwitchError>;
}
