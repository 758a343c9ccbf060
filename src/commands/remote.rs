use anyhow::{Context, Result};
use reglint::config::RemoteConfig;
use reglint::loader::Registries;
use reglint::remote::{RemoteVerifier, RiskScorer};
use reglint::validation::{CheckOutcome, ValidationReport};
use std::path::Path;
use tracing::info;

use super::{finish, load_registries};

pub async fn remote_command(data_dir: &Path, config: &RemoteConfig) -> Result<()> {
    println!("Verifying registries in {} against remote APIs", data_dir.display());

    let registries = load_registries(data_dir)?;
    let mut report = ValidationReport::new();
    report.extend(run_remote(config, &registries).await?);
    finish(report)
}

/// Existence and risk checks; a missing credential aborts before any request
pub(super) async fn run_remote(
    config: &RemoteConfig,
    registries: &Registries,
) -> Result<Vec<CheckOutcome>> {
    let index = config
        .morpho_client()
        .context("Failed to set up the Morpho API client")?;
    let scorer = config
        .risk_client()
        .context("Failed to set up the Chainalysis client")?;

    info!("Querying {}", config.morpho_api_url);
    let verifier = RemoteVerifier::new(
        &index,
        scorer.as_ref().map(|s| s as &dyn RiskScorer),
        config.checks(),
        config.batching(),
    );
    Ok(verifier.verify(registries).await)
}
