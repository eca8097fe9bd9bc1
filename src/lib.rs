//! Multichain token sweep engine for chain-abstracted smart accounts.
//!
//! Discovers an owner's token balances across supported chains, decides
//! how supertransaction fees are paid, builds a cross-chain transfer
//! batch with balance-at-execution semantics, and drives the
//! quote / sign / execute / confirm lifecycle against an execution
//! relay. Consumed as an embedded library by a UI layer; all external
//! systems enter through the capability traits in [`portfolio`],
//! [`relay`], and [`signer`].

pub mod account;
mod bindings;
pub mod chains;
pub mod config;
pub mod manual;
pub mod portfolio;
pub mod relay;
pub mod signer;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_utils;

pub use account::{AccountVersion, MultichainAccount, resolve_account, resolve_accounts};
pub use sweep::{SweepEngine, SweepOutcome, SweepPhase, SweepRequest, SweepStatus};
