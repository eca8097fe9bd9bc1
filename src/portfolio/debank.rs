//! DeBank-style balance index client.
//!
//! Thin reqwest wrapper over the two portfolio endpoints the engine
//! consumes: `/user/total_balance` and `/user/all_token_list`.

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{BalanceFetchError, BalanceIndex, IndexedToken, TotalBalance};

const ACCESS_KEY_HEADER: &str = "AccessKey";

pub struct DebankClient {
    client: Client,
    base_url: Url,
    access_key: String,
}

impl DebankClient {
    pub fn new(base_url: Url, access_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BalanceFetchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BalanceFetchError::Index(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BalanceFetchError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl BalanceIndex for DebankClient {
    async fn total_balance(&self, owner: Address) -> Result<TotalBalance, BalanceFetchError> {
        self.get_json("user/total_balance", &[("id", owner.to_string())])
            .await
    }

    async fn token_list(
        &self,
        owner: Address,
        chain_scope: &[String],
    ) -> Result<Vec<IndexedToken>, BalanceFetchError> {
        let mut query = vec![
            ("id", owner.to_string()),
            ("is_all", "true".to_string()),
        ];
        if !chain_scope.is_empty() {
            query.push(("chain_ids", chain_scope.join(",")));
        }

        self.get_json("user/all_token_list", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn client_for(server: &MockServer) -> DebankClient {
        DebankClient::new(
            Url::parse(&server.url("/")).unwrap(),
            "test-key".to_string(),
        )
    }

    #[tokio::test]
    async fn total_balance_parses_usd_value() {
        let server = MockServer::start();
        let owner: Address = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            .parse()
            .unwrap();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/user/total_balance")
                .header("AccessKey", "test-key")
                .query_param("id", owner.to_string());
            then.status(200)
                .json_body(json!({ "total_usd_value": 1234.56, "chain_list": [] }));
        });

        let client = client_for(&server);
        let total = client.total_balance(owner).await.unwrap();

        mock.assert();
        assert_eq!(total.total_usd_value, dec!(1234.56));
    }

    #[tokio::test]
    async fn token_list_scopes_query_to_chains() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/user/all_token_list")
                .query_param("is_all", "true")
                .query_param("chain_ids", "eth,base");
            then.status(200).json_body(json!([{
                "id": "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
                "chain": "base",
                "name": "USD Coin",
                "symbol": "USDC",
                "display_symbol": null,
                "decimals": 6,
                "logo_url": null,
                "price": 1.0,
                "is_verified": true,
                "is_wallet": true,
                "amount": 42.5
            }]));
        });

        let client = client_for(&server);
        let owner = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            .parse()
            .unwrap();
        let tokens = client
            .token_list(owner, &["eth".to_string(), "base".to_string()])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "USDC");
        assert_eq!(tokens[0].amount, dec!(42.5));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/user/total_balance");
            then.status(429).body("rate limited");
        });

        let client = client_for(&server);
        let owner = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            .parse()
            .unwrap();
        let error = client.total_balance(owner).await.unwrap_err();

        match error {
            BalanceFetchError::Api { status, message } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
