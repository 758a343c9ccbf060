//! Chainalysis address risk screening

use async_trait::async_trait;
use std::time::Duration;

use super::retry::{RetryPolicy, with_retry};
use super::{RemoteError, RiskScore, RiskScorer};

pub const DEFAULT_CHAINALYSIS_API_URL: &str = "https://api.chainalysis.com/api/risk/v2";

pub struct ChainalysisClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    retry: RetryPolicy,
}

impl ChainalysisClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
            retry,
        })
    }

    fn entity_url(&self, address: &str) -> String {
        format!("{}/entities/{address}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RiskScorer for ChainalysisClient {
    async fn risk_of(&self, address: &str) -> Result<RiskScore, RemoteError> {
        let url = self.entity_url(address);
        let url = url.as_str();
        let http = &self.http;
        let token = self.token.as_str();

        with_retry(&self.retry, "Chainalysis entity lookup", || async move {
            let response = http
                .get(url)
                .header("Token", token)
                .header("Content-Type", "application/json")
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
                .json::<RiskScore>()
                .await
                .map_err(|e| RemoteError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_url() {
        let client = ChainalysisClient::new(
            "https://risk.example/v2/",
            "secret",
            Duration::from_secs(5),
            RetryPolicy::immediate(1),
        )
        .unwrap();
        assert_eq!(
            client.entity_url("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            "https://risk.example/v2/entities/0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }
}
