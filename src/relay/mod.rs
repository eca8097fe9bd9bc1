//! Execution relay capability: the cross-chain network that quotes,
//! executes, and confirms supertransactions. Consumed as an abstract
//! contract; the engine never talks to the network directly.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::account::AccountVersion;
use crate::sweep::instructions::Instruction;

#[cfg(test)]
pub(crate) mod mock;

/// Relay-side failure. The message is preserved verbatim so it can be
/// surfaced to the user without rewording.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Api(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// The token paying supertransaction fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTokenRef {
    pub address: Address,
    pub chain_id: u64,
}

/// On-chain trigger for externally-funded quotes: a minimal token
/// movement from the connected wallet that anchors the fee payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub chain_id: u64,
    pub token_address: Address,
    pub amount: alloy::primitives::U256,
}

/// A priced instruction batch awaiting a quote.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub instructions: Vec<Instruction>,
    pub fee_token: FeeTokenRef,
}

/// A relay-issued quote. Opaque to the engine beyond its identity and
/// the fee token it was priced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: String,
    pub fee_token: FeeTokenRef,
    pub instruction_count: usize,
}

/// A quote the signer has approved out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuote {
    pub quote: Quote,
    pub signature: Bytes,
}

/// Handle returned as soon as the relay accepts an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionHandle {
    pub hash: TxHash,
}

/// Terminal and in-flight supertransaction statuses as the relay
/// reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Mining,
    MinedSuccess,
    MinedFail,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Mining)
    }

    pub fn is_success(self) -> bool {
        self == Self::MinedSuccess
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = match self {
            Self::Pending => "PENDING",
            Self::Mining => "MINING",
            Self::MinedSuccess => "MINED_SUCCESS",
            Self::MinedFail => "MINED_FAIL",
            Self::Failed => "FAILED",
        };
        f.write_str(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupertxReceipt {
    pub hash: TxHash,
    pub status: TransactionStatus,
}

/// Capability contract against the execution relay.
#[async_trait]
pub trait ExecutionRelay: Send + Sync {
    /// Deterministic smart-account address for a version, derived through
    /// the relay's account factory on the anchor chain.
    async fn resolve_account(
        &self,
        version: AccountVersion,
        anchor_chain_id: u64,
    ) -> Result<Address, RelayError>;

    /// Prices a batch paid from a token inside the smart account.
    async fn get_quote(&self, request: QuoteRequest) -> Result<Quote, RelayError>;

    /// Prices a batch paid by the connected wallet, anchored to an
    /// on-chain trigger.
    async fn get_on_chain_quote(
        &self,
        request: QuoteRequest,
        trigger: Trigger,
    ) -> Result<Quote, RelayError>;

    /// Requests the signer's explicit signature over an on-chain quote.
    async fn sign_on_chain_quote(&self, quote: Quote) -> Result<SignedQuote, RelayError>;

    /// Bundled sign-and-execute for self-funded quotes.
    async fn execute_quote(&self, quote: Quote) -> Result<ExecutionHandle, RelayError>;

    async fn execute_signed_quote(&self, signed: SignedQuote)
        -> Result<ExecutionHandle, RelayError>;

    async fn get_receipt(&self, hash: TxHash) -> Result<SupertxReceipt, RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(!TransactionStatus::Mining.is_terminal());
        assert!(TransactionStatus::MinedSuccess.is_terminal());
        assert!(TransactionStatus::MinedFail.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn only_mined_success_is_success() {
        assert!(TransactionStatus::MinedSuccess.is_success());
        assert!(!TransactionStatus::MinedFail.is_success());
        assert!(!TransactionStatus::Pending.is_success());
    }

    #[test]
    fn status_displays_wire_form() {
        assert_eq!(TransactionStatus::MinedSuccess.to_string(), "MINED_SUCCESS");
        assert_eq!(TransactionStatus::MinedFail.to_string(), "MINED_FAIL");
    }

    #[test]
    fn status_serde_round_trip() {
        let json = serde_json::to_string(&TransactionStatus::MinedSuccess).unwrap();
        assert_eq!(json, "\"MINED_SUCCESS\"");
        let parsed: TransactionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TransactionStatus::MinedSuccess);
    }
}
