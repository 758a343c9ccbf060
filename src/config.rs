//! Runtime settings gathered from flags and the environment

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::remote::graphql::DEFAULT_MORPHO_API_URL;
use crate::remote::risk::DEFAULT_CHAINALYSIS_API_URL;
use crate::remote::{
    Batching, ChainalysisClient, MorphoClient, RemoteChecks, RemoteError, RetryPolicy,
};

/// Settings of one validation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    /// `None` keeps the run offline
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Args)]
pub struct RemoteConfig {
    /// Skip the vault and market existence checks of custom warnings
    #[arg(long, env = "SKIP_VAULTS_API_TESTS")]
    pub skip_vaults_api: bool,

    /// Skip the existence checks of markets rewarded in points.json
    #[arg(long, env = "SKIP_MARKETS_API_TESTS")]
    pub skip_markets_api: bool,

    /// Skip the risk screening of curator addresses
    #[arg(long, env = "SKIP_RISK_API_TESTS")]
    pub skip_risk_api: bool,

    /// Chainalysis API token, required unless risk screening is skipped
    #[arg(long, env = "CHAINALYSIS_API_TOKEN", hide_env_values = true)]
    pub chainalysis_api_token: Option<String>,

    #[arg(long, env = "MORPHO_API_URL", default_value = DEFAULT_MORPHO_API_URL)]
    pub morpho_api_url: String,

    #[arg(long, env = "CHAINALYSIS_API_URL", default_value = DEFAULT_CHAINALYSIS_API_URL)]
    pub chainalysis_api_url: String,

    /// Upper bound for each HTTP request, in seconds
    #[arg(long, env = "REGLINT_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Number of requests sent concurrently
    #[arg(long, env = "REGLINT_BATCH_SIZE", default_value_t = 20)]
    pub batch_size: usize,

    /// Pause between two batches, in milliseconds
    #[arg(long, env = "REGLINT_BATCH_PAUSE_MS", default_value_t = 1000)]
    pub batch_pause_ms: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn batching(&self) -> Batching {
        Batching {
            size: self.batch_size,
            pause: Duration::from_millis(self.batch_pause_ms),
        }
    }

    pub fn checks(&self) -> RemoteChecks {
        let reason = |skip: bool, var: &str| skip.then(|| format!("{var} is set"));
        RemoteChecks {
            skip_vaults: reason(self.skip_vaults_api, "SKIP_VAULTS_API_TESTS"),
            skip_markets: reason(self.skip_markets_api, "SKIP_MARKETS_API_TESTS"),
            skip_risk: reason(self.skip_risk_api, "SKIP_RISK_API_TESTS"),
        }
    }

    pub fn morpho_client(&self) -> Result<MorphoClient, RemoteError> {
        MorphoClient::new(&self.morpho_api_url, self.timeout(), RetryPolicy::default())
    }

    /// `None` when risk screening is skipped. Running it without a token is
    /// an error.
    pub fn risk_client(&self) -> Result<Option<ChainalysisClient>, RemoteError> {
        if self.skip_risk_api {
            return Ok(None);
        }
        let token = self
            .chainalysis_api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(RemoteError::MissingCredential("CHAINALYSIS_API_TOKEN"))?;
        ChainalysisClient::new(
            &self.chainalysis_api_url,
            token,
            self.timeout(),
            RetryPolicy::default(),
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        remote: RemoteConfig,
    }

    fn parse(args: &[&str]) -> RemoteConfig {
        let mut argv = vec!["reglint"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().remote
    }

    #[test]
    fn test_skip_flags_become_reasons() {
        let config = parse(&["--skip-markets-api", "--skip-risk-api"]);
        let checks = config.checks();
        assert_eq!(checks.skip_markets.as_deref(), Some("SKIP_MARKETS_API_TESTS is set"));
        assert!(checks.skip_risk.is_some());
        assert!(matches!(config.risk_client(), Ok(None)));
    }

    #[test]
    fn test_risk_screening_needs_a_token() {
        let config = parse(&["--chainalysis-api-token", " "]);
        assert!(matches!(
            config.risk_client(),
            Err(RemoteError::MissingCredential("CHAINALYSIS_API_TOKEN"))
        ));
    }

    #[test]
    fn test_batching_settings() {
        let config = parse(&["--batch-size", "5", "--batch-pause-ms", "0"]);
        let batching = config.batching();
        assert_eq!(batching.size, 5);
        assert!(batching.pause.is_zero());
    }
}
