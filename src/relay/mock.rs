//! Scripted execution relay for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, address};
use async_trait::async_trait;

use super::{
    ExecutionHandle, ExecutionRelay, FeeTokenRef, Quote, QuoteRequest, RelayError, SignedQuote,
    SupertxReceipt, TransactionStatus, Trigger,
};
use crate::account::AccountVersion;

const V1_ACCOUNT: Address = address!("0x1000000000000000000000000000000000000001");
const V2_ACCOUNT: Address = address!("0x2000000000000000000000000000000000000002");

/// Calls the orchestrator made against the relay, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelayCall {
    Quote {
        instruction_count: usize,
        fee_token: FeeTokenRef,
    },
    OnChainQuote {
        instruction_count: usize,
        fee_token: FeeTokenRef,
        trigger: Trigger,
    },
    SignOnChainQuote,
    ExecuteQuote,
    ExecuteSignedQuote,
    GetReceipt,
}

pub(crate) struct MockRelay {
    hash: TxHash,
    resolve_failure: Option<String>,
    quote_failure: Option<String>,
    sign_failure: Option<String>,
    execute_failure: Option<String>,
    receipt_statuses: Mutex<VecDeque<TransactionStatus>>,
    calls: Mutex<Vec<RelayCall>>,
}

impl MockRelay {
    pub(crate) fn new() -> Self {
        Self {
            hash: TxHash::repeat_byte(0xab),
            resolve_failure: None,
            quote_failure: None,
            sign_failure: None,
            execute_failure: None,
            receipt_statuses: Mutex::new(VecDeque::from([TransactionStatus::MinedSuccess])),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn hash(&self) -> TxHash {
        self.hash
    }

    #[must_use]
    pub(crate) fn with_resolve_failure(mut self, message: &str) -> Self {
        self.resolve_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub(crate) fn with_quote_failure(mut self, message: &str) -> Self {
        self.quote_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub(crate) fn with_sign_failure(mut self, message: &str) -> Self {
        self.sign_failure = Some(message.to_string());
        self
    }

    #[must_use]
    pub(crate) fn with_execute_failure(mut self, message: &str) -> Self {
        self.execute_failure = Some(message.to_string());
        self
    }

    /// Statuses returned by successive `get_receipt` calls; the last one
    /// repeats once the queue drains.
    #[must_use]
    pub(crate) fn with_receipt_statuses(self, statuses: &[TransactionStatus]) -> Self {
        *self.receipt_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub(crate) fn calls(&self) -> Vec<RelayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RelayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ExecutionRelay for MockRelay {
    async fn resolve_account(
        &self,
        version: AccountVersion,
        _anchor_chain_id: u64,
    ) -> Result<Address, RelayError> {
        if let Some(message) = &self.resolve_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(match version {
            AccountVersion::V1 => V1_ACCOUNT,
            AccountVersion::V2 => V2_ACCOUNT,
        })
    }

    async fn get_quote(&self, request: QuoteRequest) -> Result<Quote, RelayError> {
        self.record(RelayCall::Quote {
            instruction_count: request.instructions.len(),
            fee_token: request.fee_token,
        });
        if let Some(message) = &self.quote_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(Quote {
            id: "quote-1".to_string(),
            fee_token: request.fee_token,
            instruction_count: request.instructions.len(),
        })
    }

    async fn get_on_chain_quote(
        &self,
        request: QuoteRequest,
        trigger: Trigger,
    ) -> Result<Quote, RelayError> {
        self.record(RelayCall::OnChainQuote {
            instruction_count: request.instructions.len(),
            fee_token: request.fee_token,
            trigger,
        });
        if let Some(message) = &self.quote_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(Quote {
            id: "onchain-quote-1".to_string(),
            fee_token: request.fee_token,
            instruction_count: request.instructions.len(),
        })
    }

    async fn sign_on_chain_quote(&self, quote: Quote) -> Result<SignedQuote, RelayError> {
        self.record(RelayCall::SignOnChainQuote);
        if let Some(message) = &self.sign_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(SignedQuote {
            quote,
            signature: Bytes::from_static(&[0xde, 0xad]),
        })
    }

    async fn execute_quote(&self, _quote: Quote) -> Result<ExecutionHandle, RelayError> {
        self.record(RelayCall::ExecuteQuote);
        if let Some(message) = &self.execute_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(ExecutionHandle { hash: self.hash })
    }

    async fn execute_signed_quote(
        &self,
        _signed: SignedQuote,
    ) -> Result<ExecutionHandle, RelayError> {
        self.record(RelayCall::ExecuteSignedQuote);
        if let Some(message) = &self.execute_failure {
            return Err(RelayError::Api(message.clone()));
        }
        Ok(ExecutionHandle { hash: self.hash })
    }

    async fn get_receipt(&self, hash: TxHash) -> Result<SupertxReceipt, RelayError> {
        self.record(RelayCall::GetReceipt);
        let mut statuses = self.receipt_statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            *statuses.front().unwrap_or(&TransactionStatus::MinedSuccess)
        };
        Ok(SupertxReceipt { hash, status })
    }
}
