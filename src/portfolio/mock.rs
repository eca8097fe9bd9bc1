//! In-memory balance index for tests.

use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{BalanceFetchError, BalanceIndex, IndexedToken, TotalBalance};

pub(crate) struct MockBalanceIndex {
    tokens: Vec<IndexedToken>,
    total_usd_value: Decimal,
    failure: Option<String>,
}

impl MockBalanceIndex {
    pub(crate) fn with_tokens(tokens: Vec<IndexedToken>) -> Self {
        let total_usd_value = tokens.iter().map(|t| t.amount * t.price).sum();
        Self {
            tokens,
            total_usd_value,
            failure: None,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            tokens: Vec::new(),
            total_usd_value: Decimal::ZERO,
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl BalanceIndex for MockBalanceIndex {
    async fn total_balance(&self, _owner: Address) -> Result<TotalBalance, BalanceFetchError> {
        if let Some(message) = &self.failure {
            return Err(BalanceFetchError::Index(message.clone()));
        }
        Ok(TotalBalance {
            total_usd_value: self.total_usd_value,
        })
    }

    async fn token_list(
        &self,
        _owner: Address,
        _chain_scope: &[String],
    ) -> Result<Vec<IndexedToken>, BalanceFetchError> {
        if let Some(message) = &self.failure {
            return Err(BalanceFetchError::Index(message.clone()));
        }
        Ok(self.tokens.clone())
    }
}
