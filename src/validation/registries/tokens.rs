use serde_json::Value;

use crate::chains;
use crate::loader::{Record, Registries, Registry};
use crate::logo;
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{DuplicateTracker, address_key, check_address, check_chain, locate};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

/// Tags a token's `metadata.tags` may carry
pub const ALLOWED_TAGS: &[&str] = &[
    "stablecoin",
    "rwa",
    "hardcoded",
    "yield",
    "lst",
    "lrt",
    "pendle",
];

const ORACLE_FIELDS: [(&str, &str); 2] = [
    ("alternativeOracle", "alternativeOracles"),
    ("alternativeHardcodedOracle", "alternativeHardcodedOracles"),
];

pub fn validate(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let scope = chains::TOKENS;
    let records: Vec<&Record> = registries.scoped(Registry::Tokens, &scope).collect();

    let mut checksum = CheckOutcome::schema(Registry::Tokens, "checksum");
    let mut chain_ids = CheckOutcome::schema(Registry::Tokens, "chain-ids");
    let mut decimals = CheckOutcome::schema(Registry::Tokens, "decimals");
    let mut unique = CheckOutcome::schema(Registry::Tokens, "unique");
    let mut tags = CheckOutcome::schema(Registry::Tokens, "tags");
    let mut oracle_fields = CheckOutcome::schema(Registry::Tokens, "oracle-fields");
    let mut logos = CheckOutcome::schema(Registry::Tokens, "logo-uri");
    let mut seen = DuplicateTracker::new();

    for record in &records {
        let location = locate(record, "address");
        let address = record.str_field("address");
        let chain_id = record.u64_field("chainId");

        if let Some(address) = address {
            checksum.tick();
            check_address(&mut checksum, &location, "address", address);
        }

        chain_ids.tick();
        check_chain(&mut chain_ids, &scope, &location, "chainId", &record.value);

        if let Some(value) = record.value.get("decimals").and_then(Value::as_i64) {
            decimals.tick();
            if !(0..=18).contains(&value) {
                decimals.push(
                    &location,
                    format!("decimals {value} out of range, should be between 0 and 18"),
                );
            }
        }

        if let (Some(address), Some(chain_id)) = (address, chain_id) {
            unique.tick();
            if let Some(first) = seen.observe(address_key(chain_id, address), record.index) {
                unique.push(
                    &location,
                    format!(
                        "duplicate of index {first} for chain {chain_id} \
                         (addresses compare case-insensitively)"
                    ),
                );
            }
        }

        let metadata = record.value.get("metadata");
        if let Some(list) = metadata.and_then(|m| m.get("tags")).and_then(Value::as_array) {
            tags.tick();
            for tag in list.iter().filter_map(Value::as_str) {
                if !ALLOWED_TAGS.contains(&tag) {
                    tags.push(
                        &location,
                        format!(
                            "unknown tag '{tag}', expected one of: {}",
                            ALLOWED_TAGS.join(", ")
                        ),
                    );
                }
            }
        }

        oracle_fields.tick();
        check_oracle_fields(&mut oracle_fields, &location, &record.value, "");
        if let Some(metadata) = metadata.filter(|m| m.is_object()) {
            check_oracle_fields(&mut oracle_fields, &location, metadata, "metadata.");
        }

        if let Some(uri) = metadata
            .and_then(|m| m.get("logoURI"))
            .and_then(Value::as_str)
            .filter(|uri| logo::is_cdn_hosted(uri))
        {
            logos.tick();
            match logo::canonical_logo_uri(uri) {
                Ok(Some(expected)) if expected != uri => logos.push(
                    &location,
                    format!("logoURI is not properly encoded: current {uri}, expected {expected}"),
                ),
                Ok(_) => {}
                Err(e) => logos.push(&location, format!("logoURI: {e}")),
            }
        }
    }

    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::Token,
            Registry::Tokens,
            "address",
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        decimals,
        unique,
        tags,
        oracle_fields,
        logos,
    ]
}

/// The plural oracle lists must be arrays; the singular spellings are
/// rejected outright.
fn check_oracle_fields(outcome: &mut CheckOutcome, location: &str, object: &Value, prefix: &str) {
    for (singular, plural) in ORACLE_FIELDS {
        if object.get(singular).is_some() {
            outcome.push(
                location,
                format!("{prefix}{singular} is not allowed, use the plural {prefix}{plural}"),
            );
        }
        if object.get(plural).is_some_and(|v| !v.is_array()) {
            outcome.push(location, format!("{prefix}{plural} must be an array"));
        }
    }
}
