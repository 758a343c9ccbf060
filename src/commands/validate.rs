use anyhow::{Context, Result};
use reglint::config::RunConfig;
use reglint::validation::Validator;

use super::remote::run_remote;
use super::{finish, load_registries};

pub async fn validate_command(config: &RunConfig) -> Result<()> {
    println!("Validating registries in: {}", config.data_dir.display());

    let registries = load_registries(&config.data_dir)?;
    let validator = Validator::new().context("Failed to compile registry schemas")?;
    let mut report = validator.validate_all(&registries);

    if let Some(remote) = &config.remote {
        report.extend(run_remote(remote, &registries).await?);
    }

    finish(report)
}
