//! Existence and risk checks against third-party APIs
//!
//! The verifier talks to the APIs through the [`MarketIndex`] and
//! [`RiskScorer`] traits so the checks can run against in-memory fakes.

mod error;
pub mod graphql;
pub mod retry;
pub mod risk;
mod verifier;

pub use error::RemoteError;
pub use graphql::MorphoClient;
pub use retry::RetryPolicy;
pub use risk::ChainalysisClient;
pub use verifier::{Batching, RemoteChecks, RemoteVerifier};

use async_trait::async_trait;
use serde::Deserialize;

/// Result of a single-entity lookup that reached the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Exists(T),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteVault {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMarket {
    pub unique_key: String,
    #[serde(default)]
    pub whitelisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub risk: String,
    #[serde(default)]
    pub risk_reason: Option<String>,
    pub status: String,
}

impl RiskScore {
    pub fn is_complete(&self) -> bool {
        self.status == "COMPLETE"
    }

    pub fn is_low(&self) -> bool {
        self.risk.eq_ignore_ascii_case("low")
    }
}

/// Vault and market lookups
#[async_trait]
pub trait MarketIndex: Send + Sync {
    async fn vault_by_address(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<Lookup<RemoteVault>, RemoteError>;

    async fn market_by_unique_key(
        &self,
        unique_key: &str,
        chain_id: u64,
    ) -> Result<Lookup<RemoteMarket>, RemoteError>;

    /// Every market of a chain in one request
    async fn markets(&self, chain_id: u64) -> Result<Vec<RemoteMarket>, RemoteError>;
}

#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn risk_of(&self, address: &str) -> Result<RiskScore, RemoteError>;
}
