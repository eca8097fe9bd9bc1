//! Smart-account version handling and deterministic address resolution.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::relay::{ExecutionRelay, RelayError};

/// Chain used to derive the deterministic account address. The derivation
/// is chain-independent for a given version, so one anchor read suffices.
pub const ANCHOR_CHAIN_ID: u64 = 8453;

/// A smart-account deployment scheme. Versions derive different
/// deterministic addresses and differ in supported fee-payment modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountVersion {
    /// The 2.1.0 deployment; supports self-funded fee payment.
    #[serde(rename = "2.1.0")]
    V1,
    /// The 2.2.0 deployment; always externally funded.
    #[serde(rename = "2.2.0")]
    V2,
}

impl AccountVersion {
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "2.1.0",
            Self::V2 => "2.2.0",
        }
    }
}

impl Display for AccountVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown account version: {0}")]
pub struct ParseAccountVersionError(String);

impl FromStr for AccountVersion {
    type Err = ParseAccountVersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "2.1.0" => Ok(Self::V1),
            "2.2.0" => Ok(Self::V2),
            other => Err(ParseAccountVersionError(other.to_string())),
        }
    }
}

/// Failure to derive a smart-account address. Independent of sweep state;
/// the caller drops any previously resolved addresses and may re-invoke.
#[derive(Debug, thiserror::Error)]
#[error("Failed to resolve smart account for version {version}: {source}")]
pub struct AccountResolutionError {
    pub version: AccountVersion,
    #[source]
    pub source: RelayError,
}

/// The smart account's address on each supported chain.
///
/// Deterministic deployment yields the same address everywhere, which the
/// `uniform` constructor captures; per-chain overrides remain possible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultichainAccount {
    overrides: HashMap<u64, Address>,
    uniform: Option<Address>,
}

impl MultichainAccount {
    /// An account deployed at the same address on every supported chain.
    pub fn uniform(address: Address) -> Self {
        Self {
            overrides: HashMap::new(),
            uniform: Some(address),
        }
    }

    pub fn insert(&mut self, chain_id: u64, address: Address) {
        self.overrides.insert(chain_id, address);
    }

    pub fn address_on(&self, chain_id: u64) -> Option<Address> {
        self.overrides.get(&chain_id).copied().or(self.uniform)
    }

    /// Whether `address` is one of this account's own addresses on any
    /// chain.
    pub fn contains(&self, address: Address) -> bool {
        self.uniform == Some(address) || self.overrides.values().any(|a| *a == address)
    }
}

/// Derives the deterministic account address for one version.
pub async fn resolve_account<R>(
    relay: &R,
    version: AccountVersion,
) -> Result<MultichainAccount, AccountResolutionError>
where
    R: ExecutionRelay + ?Sized,
{
    let address = relay
        .resolve_account(version, ANCHOR_CHAIN_ID)
        .await
        .map_err(|source| AccountResolutionError { version, source })?;

    info!(%version, %address, "Resolved smart account");
    Ok(MultichainAccount::uniform(address))
}

/// Resolves every account version independently. Any failure drops all
/// previously resolved addresses, matching the all-or-nothing contract.
pub async fn resolve_accounts<R>(
    relay: &R,
) -> Result<HashMap<AccountVersion, MultichainAccount>, AccountResolutionError>
where
    R: ExecutionRelay + ?Sized,
{
    let mut accounts = HashMap::new();
    for version in AccountVersion::ALL {
        accounts.insert(version, resolve_account(relay, version).await?);
    }
    Ok(accounts)
}
