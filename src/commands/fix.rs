use anyhow::{Context, Result};
use reglint::loader::{Registry, RegistryLoader};
use reglint::transform::{Fix, to_registry_json};
use std::path::Path;

pub fn fix_command(
    data_dir: &Path,
    registry: Registry,
    fix: Fix,
    curator: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let loader = RegistryLoader::new(data_dir);
    let path = loader.path_of(registry);

    let document = match loader.load_value(registry) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            anyhow::bail!("Failed to load {registry}");
        }
    };

    let transformed = fix.apply(registry, &document, curator)?;
    print!("{}", transformed.report);
    println!(
        "{fix}: {} change(s), {} note(s) in {registry}",
        transformed.report.changes.len(),
        transformed.report.notes.len()
    );

    if dry_run || transformed.document == document {
        return Ok(());
    }

    let text = to_registry_json(&transformed.document)?;
    std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());

    // The rewritten file must still parse as a registry
    if let Err(err) = loader.load_value(registry) {
        eprintln!("{:?}", miette::Report::new(err));
        anyhow::bail!("Rewritten {registry} no longer loads");
    }
    Ok(())
}
