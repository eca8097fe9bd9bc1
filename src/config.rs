//! Engine configuration. Deserialized by the embedding client; optional
//! fields fall back to the original deployment's defaults.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Tokens below this USD value are not worth a sweep instruction.
pub const DEFAULT_MIN_SWEEP_USD: Decimal = dec!(0.10);

/// Delay between obtaining the supertransaction hash and the first
/// receipt read, giving the relay time to index the execution.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Delay before the post-success token list refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(3);

/// Settings for the balance-index HTTP client.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceIndexConfig {
    pub base_url: Url,
    pub access_key: String,
}

/// Bounds for the receipt-confirmation retry loop.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReceiptPollConfig {
    /// Retries after the initial read, exponential backoff between them.
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReceiptPollConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay_ms: 1_000,
            max_delay_ms: 16_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    pub balance_index: BalanceIndexConfig,
    min_sweep_usd: Option<Decimal>,
    settle_delay_secs: Option<u64>,
    refresh_delay_secs: Option<u64>,
    #[serde(default)]
    pub receipt_poll: ReceiptPollConfig,
    /// Per-chain RPC overrides, keyed by the chain's external identifier
    /// or alias. Chains absent here use the registry's default endpoint.
    #[serde(default)]
    pub rpc_overrides: HashMap<String, Url>,
}

impl SweepConfig {
    pub fn min_sweep_usd(&self) -> Decimal {
        self.min_sweep_usd.unwrap_or(DEFAULT_MIN_SWEEP_USD)
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay_secs
            .map_or(DEFAULT_SETTLE_DELAY, Duration::from_secs)
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay_secs
            .map_or(DEFAULT_REFRESH_DELAY, Duration::from_secs)
    }

    /// RPC endpoint for a chain, override first, registry default second.
    pub fn rpc_url(&self, chain_id: u64) -> Option<Url> {
        let override_url = self
            .rpc_overrides
            .iter()
            .find(|(key, _)| crate::chains::resolve_internal_id(key) == Some(chain_id))
            .map(|(_, url)| url.clone());
        if override_url.is_some() {
            return override_url;
        }
        crate::chains::descriptor(chain_id)
            .and_then(|d| Url::parse(d.default_rpc_url).ok())
    }
}
