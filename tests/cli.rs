use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

const ARRAY_REGISTRIES: [&str; 10] = [
    "tokens.json",
    "price-feeds.json",
    "oracle-vaults.json",
    "exchange-rates.json",
    "spot-prices.json",
    "oracle-prices.json",
    "curators-listing.json",
    "vaults-listing.json",
    "vaults-v2-listing.json",
    "custom-warnings.json",
];

fn token(address: &str, symbol: &str) -> Value {
    json!({
        "chainId": 1,
        "address": address,
        "name": symbol,
        "symbol": symbol,
        "decimals": 18,
        "isWhitelisted": true
    })
}

/// A data directory with every registry present and the given tokens
fn write_data_dir(dir: &Path, tokens: Vec<Value>) -> Result<(), Box<dyn std::error::Error>> {
    for file in ARRAY_REGISTRIES {
        fs::write(dir.join(file), "[]\n")?;
    }
    fs::write(dir.join("points.json"), "{}\n")?;
    fs::write(
        dir.join("tokens.json"),
        serde_json::to_string_pretty(&Value::Array(tokens))?,
    )?;
    Ok(())
}

fn reglint() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("reglint")?;
    cmd.env_remove("REGLINT_DATA_DIR");
    Ok(cmd)
}

#[test]
fn validate_passes_on_clean_registries() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![token(USDC, "USDC"), token(WETH, "WETH")])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("checks passed"));
    Ok(())
}

#[test]
fn validate_is_the_default_command() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![token(USDC, "USDC")])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn validate_fails_on_unchecksummed_token() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![token(&USDC.to_lowercase(), "USDC")])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("tokens/checksum"))
        .stderr(predicate::str::contains("violation(s) found"));
    Ok(())
}

#[test]
fn validate_reports_missing_registry_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![])?;
    fs::remove_file(dir.path().join("curators-listing.json"))?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("curators-listing.json"));
    Ok(())
}

#[test]
fn validate_reports_malformed_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![])?;
    fs::write(dir.path().join("price-feeds.json"), "[\n  {,\n]")?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("price-feeds.json"));
    Ok(())
}

#[test]
fn checksum_prints_canonical_form() -> Result<(), Box<dyn std::error::Error>> {
    reglint()?
        .args(["checksum", &USDC.to_lowercase()])
        .assert()
        .success()
        .stdout(predicate::str::contains(USDC));
    Ok(())
}

#[test]
fn checksum_rejects_short_address() -> Result<(), Box<dyn std::error::Error>> {
    reglint()?.args(["checksum", "0x1234"]).assert().failure();
    Ok(())
}

#[test]
fn fix_dry_run_leaves_file_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![token(&USDC.to_lowercase(), "USDC")])?;
    let before = fs::read_to_string(dir.path().join("tokens.json"))?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "tokens", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(USDC));

    assert_eq!(fs::read_to_string(dir.path().join("tokens.json"))?, before);
    Ok(())
}

#[test]
fn fix_rewrites_addresses_so_validation_passes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![token(&USDC.to_lowercase(), "USDC")])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "tokens"])
        .assert()
        .success();

    let fixed: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("tokens.json"))?)?;
    assert_eq!(fixed[0]["address"], USDC);

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("validate")
        .assert()
        .success();
    Ok(())
}

#[test]
fn fix_needs_only_the_fixed_registry() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let tokens = json!([token(&USDC.to_lowercase(), "USDC")]);
    fs::write(dir.path().join("tokens.json"), serde_json::to_string_pretty(&tokens)?)?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let fixed: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("tokens.json"))?)?;
    assert_eq!(fixed[0]["address"], USDC);
    Ok(())
}

#[test]
fn fix_removes_a_single_curator_from_vaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let vaults = json!([{
        "address": USDC,
        "chainId": 1,
        "forumLink": "https://forum.morpho.org/t/1",
        "curators": [{"name": "Gauntlet"}, {"name": "Re7"}]
    }]);
    fs::write(
        dir.path().join("vaults-listing.json"),
        serde_json::to_string_pretty(&vaults)?,
    )?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "vaults", "-t", "remove-curators", "--curator", "Re7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("remove-curators: 1 change(s)"));

    let path = dir.path().join("vaults-listing.json");
    let fixed: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    assert_eq!(fixed[0]["curators"], json!([{"name": "Gauntlet"}]));
    assert_eq!(fixed[0]["forumLink"], vaults[0]["forumLink"]);
    Ok(())
}

#[test]
fn fix_rejects_curator_filter_on_other_transforms() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "vaults", "--curator", "Re7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--curator"));
    Ok(())
}

#[test]
fn fix_rejects_transform_for_wrong_registry() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .args(["fix", "curators", "--transform", "logo-uris"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn migrate_dry_run_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let legacy = tempdir()?;
    let out = tempdir()?;

    reglint()?
        .arg("migrate")
        .arg("--legacy-dir")
        .arg(legacy.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write 0 entries to all-feeds.json"));

    assert!(!out.path().join("all-feeds.json").exists());
    Ok(())
}

#[test]
fn remote_requires_chainalysis_token() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_data_dir(dir.path(), vec![])?;

    reglint()?
        .arg("--data-dir")
        .arg(dir.path())
        .arg("remote")
        .env_remove("CHAINALYSIS_API_TOKEN")
        .env_remove("SKIP_RISK_API_TESTS")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHAINALYSIS_API_TOKEN"));
    Ok(())
}
