//! Balance source adapter: normalizes balance-index responses into
//! canonical token records and applies sweep eligibility filtering.

use alloy::primitives::Address;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chains;

pub mod debank;
#[cfg(test)]
pub(crate) mod mock;

/// Errors from the balance index. Any failure is a whole-batch failure:
/// callers must discard previously fetched token lists rather than show
/// possibly stale sweep candidates.
#[derive(Debug, thiserror::Error)]
pub enum BalanceFetchError {
    #[error("Failed to fetch token balances: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Balance index error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Failed to fetch token balances: {0}")]
    Index(String),
}

/// A token entry as the balance index reports it, before normalization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexedToken {
    pub id: String,
    pub chain: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub display_symbol: Option<String>,
    pub decimals: u8,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub price: Decimal,
    pub is_verified: bool,
    pub is_wallet: bool,
    pub amount: Decimal,
}

/// Aggregate USD balance for an owner address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TotalBalance {
    pub total_usd_value: Decimal,
}

/// Read-only portfolio discovery capability.
#[async_trait]
pub trait BalanceIndex: Send + Sync {
    async fn total_balance(&self, owner: Address) -> Result<TotalBalance, BalanceFetchError>;

    /// Token balances for `owner`, scoped to the given external chain ids.
    async fn token_list(
        &self,
        owner: Address,
        chain_scope: &[String],
    ) -> Result<Vec<IndexedToken>, BalanceFetchError>;
}

/// Canonical token record produced by the adapter. `resolved_address` and
/// `is_native` are derived exactly once here and never recomputed
/// downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub token_id: String,
    pub chain_external_id: String,
    pub symbol: String,
    pub display_symbol: Option<String>,
    pub name: String,
    pub decimals: u8,
    pub logo_url: Option<String>,
    pub price_usd: Decimal,
    pub quantity: Decimal,
    pub verified: bool,
    pub wallet_owned: bool,
    pub resolved_address: Option<Address>,
    pub is_native: bool,
}

impl TokenRecord {
    pub fn usd_value(&self) -> Decimal {
        self.quantity * self.price_usd
    }

    /// Internal chain id, when the token's chain is one this system supports.
    pub fn chain_id(&self) -> Option<u64> {
        chains::resolve_internal_id(&self.chain_external_id)
    }

    /// Stable identifier for picker selections, unique per (chain, token).
    pub fn key(&self) -> String {
        format!("{}-{}", self.chain_external_id, self.token_id)
    }

    fn from_indexed(token: IndexedToken) -> Self {
        let resolved_address = resolve_token_address(&token.id, &token.chain);
        let is_native = match (resolved_address, chains::resolve_internal_id(&token.chain)) {
            (Some(address), Some(chain_id)) => chains::is_native_sentinel(chain_id, address),
            _ => false,
        };

        Self {
            token_id: token.id,
            chain_external_id: token.chain,
            symbol: token.symbol,
            display_symbol: token.display_symbol,
            name: token.name,
            decimals: token.decimals,
            logo_url: token.logo_url,
            price_usd: token.price,
            quantity: token.amount,
            verified: token.is_verified,
            wallet_owned: token.is_wallet,
            resolved_address,
            is_native,
        }
    }
}

/// Extracts an address-shaped substring from a balance-index token id.
///
/// Token ids are either a bare address, a composite like
/// `chain:0x…` / `chain_0x…`, or the chain's own identifier for the
/// native asset (which maps to the zero-address sentinel).
fn resolve_token_address(token_id: &str, chain_external_id: &str) -> Option<Address> {
    let trimmed = token_id.trim();

    if let Ok(address) = trimmed.parse::<Address>() {
        return Some(address);
    }

    for segment in trimmed.split([':', '_']) {
        if let Ok(address) = segment.trim().parse::<Address>() {
            return Some(address);
        }
    }

    if trimmed == chain_external_id.trim() {
        return Some(Address::ZERO);
    }

    None
}

/// Whether native tokens survive eligibility filtering. `Exclude` is used
/// when the caller needs fee-payable ERC-20-like assets only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFilter {
    Include,
    Exclude,
}

/// An owner's discovered holdings.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub total_usd_value: Decimal,
    pub tokens: Vec<TokenRecord>,
}

impl Portfolio {
    pub fn empty() -> Self {
        Self {
            total_usd_value: Decimal::ZERO,
            tokens: Vec::new(),
        }
    }

    /// Tokens eligible for sweeping, sorted descending by USD value.
    ///
    /// Eligible means: index-verified, wallet-owned, on a supported chain,
    /// with a resolvable address and a strictly positive quantity.
    pub fn eligible_tokens(&self, native_filter: NativeFilter) -> Vec<TokenRecord> {
        let mut eligible: Vec<TokenRecord> = self
            .tokens
            .iter()
            .filter(|token| {
                token.verified
                    && token.wallet_owned
                    && token.chain_id().is_some()
                    && token.resolved_address.is_some()
                    && token.quantity > Decimal::ZERO
                    && (native_filter == NativeFilter::Include || !token.is_native)
            })
            .cloned()
            .collect();

        eligible.sort_by(|a, b| b.usd_value().cmp(&a.usd_value()));
        eligible
    }
}

/// Queries the balance index for an owner's total balance and token list
/// in parallel and normalizes the result.
pub async fn fetch_portfolio<I>(
    index: &I,
    owner: Address,
    chain_scope: &[String],
) -> Result<Portfolio, BalanceFetchError>
where
    I: BalanceIndex + ?Sized,
{
    let (total, tokens) = tokio::try_join!(
        index.total_balance(owner),
        index.token_list(owner, chain_scope)
    )?;

    Ok(Portfolio {
        total_usd_value: total.total_usd_value,
        tokens: tokens.into_iter().map(TokenRecord::from_indexed).collect(),
    })
}

/// Discovers the eligible token set for `owner`.
pub async fn fetch_eligible_tokens<I>(
    index: &I,
    owner: Address,
    chain_scope: &[String],
    native_filter: NativeFilter,
) -> Result<Vec<TokenRecord>, BalanceFetchError>
where
    I: BalanceIndex + ?Sized,
{
    let portfolio = fetch_portfolio(index, owner, chain_scope).await?;
    Ok(portfolio.eligible_tokens(native_filter))
}

/// Fetches portfolios for several owners in parallel. Any single failure
/// fails the whole batch.
pub async fn fetch_portfolios<I>(
    index: &I,
    owners: &[Address],
    chain_scope: &[String],
) -> Result<Vec<Portfolio>, BalanceFetchError>
where
    I: BalanceIndex + ?Sized,
{
    try_join_all(
        owners
            .iter()
            .map(|owner| fetch_portfolio(index, *owner, chain_scope)),
    )
    .await
}

/// Applies the sweep-worthiness floor. Distinct from fee-token
/// eligibility, which has no minimum.
pub fn filter_sweep_worthy(tokens: Vec<TokenRecord>, min_usd: Decimal) -> Vec<TokenRecord> {
    tokens
        .into_iter()
        .filter(|token| token.usd_value() >= min_usd)
        .collect()
}
