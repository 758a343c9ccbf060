use anyhow::{Context, Result};
use reglint::loader::RegistryLoader;
use reglint::transform::migrate::{FEEDS_OUTPUT, TOKENS_OUTPUT, VAULTS_OUTPUT};
use reglint::transform::{LegacySources, migrate, to_registry_json};
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub fn migrate_command(legacy_dir: &Path, out_dir: &Path, dry_run: bool) -> Result<()> {
    println!("Migrating legacy lists from: {}", legacy_dir.display());

    let loader = RegistryLoader::new(legacy_dir);
    let (sources, notes) = match LegacySources::load(&loader) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            anyhow::bail!("Failed to read legacy lists from {}", legacy_dir.display());
        }
    };
    for note in &notes {
        info!("{note}");
    }

    let migration = migrate(&sources);
    print!("{}", migration.report);

    let feeds = serde_json::to_value(&migration.feeds).context("Failed to serialize feeds")?;
    let outputs = [
        (FEEDS_OUTPUT, feeds),
        (TOKENS_OUTPUT, Value::Array(migration.tokens)),
        (VAULTS_OUTPUT, Value::Array(migration.vaults)),
    ];

    for (file_name, document) in &outputs {
        let count = document.as_array().map_or(0, Vec::len);
        if dry_run {
            println!("Would write {count} entries to {file_name}");
            continue;
        }

        let path = out_dir.join(file_name);
        let text = to_registry_json(document)?;
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {count} entries to {}", path.display());
    }

    Ok(())
}
