mod checksum;
mod fix;
mod migrate;
mod remote;
mod validate;

pub use checksum::checksum_command;
pub use fix::fix_command;
pub use migrate::migrate_command;
pub use remote::remote_command;
pub use validate::validate_command;

use anyhow::Result;
use colored::Colorize;
use reglint::loader::{Registries, RegistryLoader};
use reglint::validation::{CheckOutcome, ValidationReport};
use std::path::Path;

/// Load every registry, rendering load failures as diagnostics
fn load_registries(data_dir: &Path) -> Result<Registries> {
    match RegistryLoader::new(data_dir).load_all() {
        Ok(registries) => Ok(registries),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            anyhow::bail!("Failed to load registries from {}", data_dir.display());
        }
    }
}

fn print_outcome(outcome: &CheckOutcome) {
    if let Some(reason) = &outcome.skipped {
        println!("{} {} skipped: {reason}", "-".yellow(), outcome.check);
    } else if outcome.passed() {
        println!("{} {} ({} checked)", "✓".green(), outcome.check, outcome.checked);
    } else {
        println!(
            "{} {}: {} violation(s)",
            "✗".red(),
            outcome.check,
            outcome.violations.len()
        );
    }
}

/// Print the per-check summary and fail when anything was violated
fn finish(report: ValidationReport) -> Result<()> {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }

    match report.into_result() {
        Ok(report) => {
            let checks = report.outcomes.len();
            println!("\n{} {checks} checks passed", "✅".green().bold());
            Ok(())
        }
        Err(failure) => {
            let total = failure.total;
            eprintln!();
            eprintln!("{:?}", miette::Report::new(failure));
            anyhow::bail!("{total} violation(s) found");
        }
    }
}
