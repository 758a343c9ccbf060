//! Morpho GraphQL API client

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::retry::{RetryPolicy, with_retry};
use super::{Lookup, MarketIndex, RemoteError, RemoteMarket, RemoteVault};

pub const DEFAULT_MORPHO_API_URL: &str = "https://api.morpho.org/graphql";

const VAULT_BY_ADDRESS: &str = r#"
query VaultByAddress($address: String!, $chainId: Int!) {
  vaultByAddress(address: $address, chainId: $chainId) {
    address
  }
}"#;

const MARKET_BY_UNIQUE_KEY: &str = r#"
query MarketByUniqueKey($uniqueKey: String!, $chainId: Int!) {
  marketByUniqueKey(uniqueKey: $uniqueKey, chainId: $chainId) {
    uniqueKey
    whitelisted
  }
}"#;

const MARKETS: &str = r#"
query Markets($chainId: Int!) {
  markets(chainId: $chainId) {
    uniqueKey
    whitelisted
  }
}"#;

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultData {
    vault_by_address: Option<RemoteVault>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketData {
    market_by_unique_key: Option<RemoteMarket>,
}

#[derive(Debug, Deserialize)]
struct MarketsData {
    #[serde(default)]
    markets: Vec<RemoteMarket>,
}

impl<T> Response<T> {
    fn is_not_found(&self) -> bool {
        !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.status.as_deref() == Some("NOT_FOUND"))
    }

    fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// A single-entity answer: NOT_FOUND errors and null data both mean the
    /// entity does not exist, any other error is a failure.
    fn into_lookup<U>(self, pick: impl FnOnce(T) -> Option<U>) -> Result<Lookup<U>, RemoteError> {
        if self.is_not_found() {
            return Ok(Lookup::NotFound);
        }
        if let Some(message) = self.error_message() {
            return Err(RemoteError::GraphQl(message));
        }
        Ok(match self.data.and_then(pick) {
            Some(entity) => Lookup::Exists(entity),
            None => Lookup::NotFound,
        })
    }
}

pub struct MorphoClient {
    http: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl MorphoClient {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self {
            http,
            url: url.into(),
            retry,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        name: &str,
        query: &str,
        variables: Value,
    ) -> Result<Response<T>, RemoteError> {
        let body = json!({ "query": query, "variables": variables });
        let body = &body;
        let http = &self.http;
        let url = self.url.as_str();

        debug!("Morpho API {name} {}", body["variables"]);
        with_retry(&self.retry, name, || async move {
            let response = http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|source| RemoteError::Http {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(RemoteError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response
                .json::<Response<T>>()
                .await
                .map_err(|e| RemoteError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }
}

#[async_trait]
impl MarketIndex for MorphoClient {
    async fn vault_by_address(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<Lookup<RemoteVault>, RemoteError> {
        self.query::<VaultData>(
            "vaultByAddress",
            VAULT_BY_ADDRESS,
            json!({ "address": address, "chainId": chain_id }),
        )
        .await?
        .into_lookup(|data| data.vault_by_address)
    }

    async fn market_by_unique_key(
        &self,
        unique_key: &str,
        chain_id: u64,
    ) -> Result<Lookup<RemoteMarket>, RemoteError> {
        self.query::<MarketData>(
            "marketByUniqueKey",
            MARKET_BY_UNIQUE_KEY,
            json!({ "uniqueKey": unique_key, "chainId": chain_id }),
        )
        .await?
        .into_lookup(|data| data.market_by_unique_key)
    }

    async fn markets(&self, chain_id: u64) -> Result<Vec<RemoteMarket>, RemoteError> {
        let response = self
            .query::<MarketsData>("markets", MARKETS, json!({ "chainId": chain_id }))
            .await?;
        if let Some(message) = response.error_message() {
            return Err(RemoteError::GraphQl(format!("chain {chain_id}: {message}")));
        }
        Ok(response.data.map(|data| data.markets).unwrap_or_default())
    }
}
