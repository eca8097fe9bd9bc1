//! Shared test fixtures: token builders and in-memory database setup.

use alloy::primitives::Address;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::SqlitePool;

use crate::chains;
use crate::portfolio::{IndexedToken, TokenRecord};

/// In-memory SQLite pool for history-store tests.
pub(crate) async fn setup_test_db() -> SqlitePool {
    SqlitePool::connect(":memory:").await.unwrap()
}

/// Builder for raw balance-index token entries with sensible defaults.
pub(crate) struct IndexedTokenBuilder {
    token: IndexedToken,
}

impl IndexedTokenBuilder {
    pub(crate) fn new(id: &str, chain: &str) -> Self {
        Self {
            token: IndexedToken {
                id: id.to_string(),
                chain: chain.to_string(),
                name: "Test Token".to_string(),
                symbol: "TEST".to_string(),
                display_symbol: None,
                decimals: 18,
                logo_url: None,
                price: dec!(1),
                is_verified: true,
                is_wallet: true,
                amount: dec!(1),
            },
        }
    }

    #[must_use]
    pub(crate) fn symbol(mut self, symbol: &str) -> Self {
        self.token.symbol = symbol.to_string();
        self
    }

    #[must_use]
    pub(crate) fn amount(mut self, amount: Decimal) -> Self {
        self.token.amount = amount;
        self
    }

    #[must_use]
    pub(crate) fn price(mut self, price: Decimal) -> Self {
        self.token.price = price;
        self
    }

    #[must_use]
    pub(crate) fn decimals(mut self, decimals: u8) -> Self {
        self.token.decimals = decimals;
        self
    }

    #[must_use]
    pub(crate) fn verified(mut self, verified: bool) -> Self {
        self.token.is_verified = verified;
        self
    }

    #[must_use]
    pub(crate) fn wallet_owned(mut self, wallet_owned: bool) -> Self {
        self.token.is_wallet = wallet_owned;
        self
    }

    pub(crate) fn build(self) -> IndexedToken {
        self.token
    }
}

/// Builder for normalized token records, bypassing the balance index.
pub(crate) struct TokenRecordBuilder {
    record: TokenRecord,
}

impl TokenRecordBuilder {
    fn base(
        token_id: &str,
        chain: &str,
        resolved_address: Option<Address>,
        is_native: bool,
    ) -> Self {
        Self {
            record: TokenRecord {
                token_id: token_id.to_string(),
                chain_external_id: chain.to_string(),
                symbol: "TEST".to_string(),
                display_symbol: None,
                name: "Test Token".to_string(),
                decimals: 18,
                logo_url: None,
                price_usd: dec!(1),
                quantity: dec!(1),
                verified: true,
                wallet_owned: true,
                resolved_address,
                is_native,
            },
        }
    }

    /// An ERC-20 record whose id is its on-chain address.
    pub(crate) fn erc20(address: &str, chain: &str) -> Self {
        let parsed = address.parse::<Address>().unwrap();
        Self::base(address, chain, Some(parsed), false)
    }

    /// A native-asset record (zero-address sentinel, id == chain id).
    pub(crate) fn native(chain: &str) -> Self {
        let symbol = chains::resolve_internal_id(chain)
            .and_then(chains::descriptor)
            .map_or("ETH", |d| d.native_symbol);
        let mut builder = Self::base(chain, chain, Some(Address::ZERO), true);
        builder.record.symbol = symbol.to_string();
        builder
    }

    /// A record whose identifier resolves to no address.
    pub(crate) fn unresolved(token_id: &str, chain: &str) -> Self {
        Self::base(token_id, chain, None, false)
    }

    #[must_use]
    pub(crate) fn symbol(mut self, symbol: &str) -> Self {
        self.record.symbol = symbol.to_string();
        self
    }

    #[must_use]
    pub(crate) fn quantity(mut self, quantity: Decimal) -> Self {
        self.record.quantity = quantity;
        self
    }

    #[must_use]
    pub(crate) fn price(mut self, price: Decimal) -> Self {
        self.record.price_usd = price;
        self
    }

    #[must_use]
    pub(crate) fn decimals(mut self, decimals: u8) -> Self {
        self.record.decimals = decimals;
        self
    }

    pub(crate) fn build(self) -> TokenRecord {
        self.record
    }
}
