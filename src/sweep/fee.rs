//! Fee-payment strategy: which token pays supertransaction fees and
//! whether the sweep runs self-funded or externally funded.

use serde::{Deserialize, Serialize};

use crate::account::AccountVersion;
use crate::portfolio::TokenRecord;
use crate::relay::FeeTokenRef;

/// Candidate cap for EOA-held fee tokens. Unlike sweep-worthiness, fee
/// eligibility has no minimum USD floor.
pub const FEE_CANDIDATE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeMode {
    /// Fee paid from a token inside the swept smart account. No chain
    /// switch needed; requires a non-native, transferable token.
    SelfFunded,
    /// Fee paid by the connected wallet's own holdings.
    ExternallyFunded,
}

/// The outcome of the version × composition decision table.
#[derive(Debug, Clone, PartialEq)]
pub enum FeePlan {
    /// Pay fees from the highest-USD-value non-native token in the sweep
    /// set. Only reachable for V1 accounts.
    SelfFunded { token: TokenRecord },
    /// Pay fees from an EOA-held token the user selects.
    ExternallyFunded,
}

/// A concrete fee choice handed to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSelection {
    pub token: TokenRecord,
    pub chain_id: u64,
    pub mode: FeeMode,
}

impl FeeSelection {
    /// Builds a selection from a token record; `None` when the token has
    /// no resolvable address or unsupported chain.
    pub fn new(token: TokenRecord, mode: FeeMode) -> Option<Self> {
        let chain_id = token.chain_id()?;
        token.resolved_address?;
        Some(Self {
            token,
            chain_id,
            mode,
        })
    }

    pub fn fee_token_ref(&self) -> FeeTokenRef {
        FeeTokenRef {
            // new() guarantees the address resolved
            address: self.token.resolved_address.unwrap_or_default(),
            chain_id: self.chain_id,
        }
    }
}

/// Decision table (account version × token composition):
///
/// | version | composition              | mode              |
/// |---------|--------------------------|-------------------|
/// | V1      | ≥1 non-native eligible   | SelfFunded        |
/// | V1      | only native tokens       | ExternallyFunded  |
/// | V2      | any                      | ExternallyFunded  |
pub fn select_fee_strategy(version: AccountVersion, sweep_tokens: &[TokenRecord]) -> FeePlan {
    if version == AccountVersion::V2 {
        return FeePlan::ExternallyFunded;
    }

    sweep_tokens
        .iter()
        .filter(|token| !token.is_native && token.resolved_address.is_some())
        .max_by(|a, b| a.usd_value().cmp(&b.usd_value()))
        .map_or(FeePlan::ExternallyFunded, |token| FeePlan::SelfFunded {
            token: token.clone(),
        })
}

/// Sticky selection over the EOA fee-token candidate set.
///
/// Defaults to the highest-USD candidate; an explicit pick persists until
/// the wallet disconnects or the picked token leaves the candidate set,
/// at which point the default is re-selected.
#[derive(Debug, Default, Clone)]
pub struct FeeTokenPicker {
    selected: Option<String>,
}

impl FeeTokenPicker {
    /// Top candidates among EOA-held eligible tokens, by USD value.
    pub fn candidates(eoa_tokens: &[TokenRecord]) -> Vec<TokenRecord> {
        let mut sorted = eoa_tokens.to_vec();
        sorted.sort_by(|a, b| b.usd_value().cmp(&a.usd_value()));
        sorted.truncate(FEE_CANDIDATE_LIMIT);
        sorted
    }

    pub fn select(&mut self, key: String) {
        self.selected = Some(key);
    }

    /// Clears the selection, e.g. on wallet disconnect.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// The effective selection within `candidates`. Re-selects the
    /// highest-value candidate when the previous pick disappeared.
    pub fn current<'a>(&mut self, candidates: &'a [TokenRecord]) -> Option<&'a TokenRecord> {
        if let Some(key) = &self.selected {
            if let Some(token) = candidates.iter().find(|t| &t.key() == key) {
                return Some(token);
            }
        }

        let fallback = candidates.first()?;
        self.selected = Some(fallback.key());
        Some(fallback)
    }
}
