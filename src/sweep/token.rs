//! Canonical sweep token shape and normalization from discovered or
//! manually entered balance records.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::warn;

use crate::manual::ManualTokenEntry;
use crate::portfolio::TokenRecord;

/// A token queued for sweeping, keyed by internal chain id.
///
/// For native tokens `amount` and `decimals` are a snapshot captured at
/// normalization time: native transfers use a fixed value because the
/// relay's balance-at-execution primitive only reads token contracts.
/// For non-native tokens the amount is irrelevant; the transfer
/// instruction evaluates the account's balance at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepToken {
    pub chain_id: u64,
    pub address: Address,
    pub is_native: bool,
    pub amount: Option<Decimal>,
    pub decimals: Option<u8>,
}

impl SweepToken {
    /// Normalizes a discovered balance record. Returns `None` when the
    /// record carries no resolvable address or its chain is unsupported.
    pub fn from_token_record(record: &TokenRecord) -> Option<Self> {
        let address = record.resolved_address?;
        let chain_id = record.chain_id()?;

        Some(Self {
            chain_id,
            address,
            is_native: record.is_native,
            amount: Some(record.quantity),
            decimals: Some(record.decimals),
        })
    }

    /// Normalizes a manually entered token. Returns `None` when the atomic
    /// balance cannot be represented as a decimal snapshot.
    pub fn from_manual_entry(entry: &ManualTokenEntry) -> Option<Self> {
        let amount = atomic_to_decimal(entry.balance, entry.decimals)?;

        Some(Self {
            chain_id: entry.chain_id,
            address: entry.address,
            is_native: entry.is_native(),
            amount: Some(amount),
            decimals: Some(entry.decimals),
        })
    }

    /// The snapshot amount in atomic units, for fixed-value native
    /// transfers. `None` when the snapshot is missing or unrepresentable.
    pub fn atomic_amount(&self) -> Option<U256> {
        let amount = self.amount?;
        let decimals = self.decimals?;
        decimal_to_atomic(amount, decimals)
    }
}

/// Converts a human-readable amount to atomic units, truncating any
/// fractional digits beyond the token's precision.
pub fn decimal_to_atomic(amount: Decimal, decimals: u8) -> Option<U256> {
    if amount.is_sign_negative() {
        return None;
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    let mantissa = normalized.mantissa().unsigned_abs();

    if scale > u32::from(decimals) {
        let excess = scale - u32::from(decimals);
        if excess > 38 {
            return Some(U256::ZERO);
        }
        Some(U256::from(mantissa / 10u128.checked_pow(excess)?))
    } else {
        let shift = u32::from(decimals) - scale;
        U256::from(mantissa).checked_mul(U256::from(10u8).pow(U256::from(shift)))
    }
}

/// Converts an atomic balance back to a human-readable decimal. `None`
/// when the balance exceeds decimal precision.
pub fn atomic_to_decimal(balance: U256, decimals: u8) -> Option<Decimal> {
    let raw: u128 = balance.try_into().ok()?;
    let raw: i128 = raw.try_into().ok()?;

    match Decimal::try_from_i128_with_scale(raw, u32::from(decimals)) {
        Ok(amount) => Some(amount),
        Err(error) => {
            warn!("Atomic balance {balance} with {decimals} decimals not representable: {error}");
            None
        }
    }
}
