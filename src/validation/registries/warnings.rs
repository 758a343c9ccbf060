use serde_json::Value;

use crate::address::is_market_id;
use crate::chains::VALID_CHAIN_IDS;
use crate::loader::{Record, Registries, Registry};
use crate::models::{WarningPart, WarningTarget};
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{DuplicateTracker, check_address, is_blank};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

fn label(record: &Record) -> String {
    let index = record.index;
    match (record.str_field("vaultAddress"), record.str_field("marketId")) {
        (Some(vault), _) => format!("index {index} (vault: {vault})"),
        (None, Some(market)) => format!("index {index} (market: {market})"),
        (None, None) => format!("index {index}"),
    }
}

pub fn validate(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::CustomWarnings;
    let records: Vec<&Record> = registries.records(registry).iter().collect();

    let mut targets = CheckOutcome::schema(registry, "target");
    let mut checksum = CheckOutcome::schema(registry, "checksum");
    let mut market_ids = CheckOutcome::schema(registry, "market-id");
    let mut unique = CheckOutcome::schema(registry, "unique");
    let mut chain_ids = CheckOutcome::schema(registry, "chain-ids");
    let mut metadata = CheckOutcome::schema(registry, "metadata");
    let mut seen = DuplicateTracker::new();

    for record in &records {
        let location = label(record);

        if let Some(chain_id) = record.u64_field("chainId") {
            chain_ids.tick();
            if !VALID_CHAIN_IDS.contains(&chain_id) {
                chain_ids.push(&location, format!("invalid chainId {chain_id}"));
            }
        }

        if let Some(meta) = record.value.get("metadata").filter(|m| m.is_object()) {
            metadata.tick();
            for message in check_metadata(meta) {
                metadata.push(&location, message);
            }
        }

        targets.tick();
        let target = match WarningTarget::of_value(&record.value) {
            Ok(target) => target,
            Err(message) => {
                targets.push(&location, message);
                continue;
            }
        };

        match target {
            WarningTarget::Vault(address) => {
                checksum.tick();
                check_address(&mut checksum, &location, "vaultAddress", address);
            }
            WarningTarget::Market(market_id) => {
                market_ids.tick();
                if !is_market_id(market_id) {
                    market_ids.push(
                        &location,
                        format!(
                            "invalid marketId format {market_id}, \
                             expected 0x followed by 64 hex characters"
                        ),
                    );
                }
            }
        }

        // A missing chainId is reported by the schema check
        let Some(chain_id) = record.u64_field("chainId") else {
            continue;
        };
        unique.tick();
        let key = (target.kind(), chain_id, target.id().to_ascii_lowercase());
        if let Some(first) = seen.observe(key, record.index) {
            unique.push(
                &location,
                format!(
                    "duplicate {} warning on chain {chain_id} (first at index {first})",
                    target.kind()
                ),
            );
        }
    }

    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::CustomWarning,
            registry,
            "chainId",
            records.iter().copied(),
        ),
        targets,
        checksum,
        market_ids,
        unique,
        chain_ids,
        metadata,
    ]
}

/// A warning carries either a flat `content` string or a `parts` list, never
/// both.
pub fn check_metadata(metadata: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let content = metadata.get("content");
    let parts = metadata.get("parts");

    match (content, parts) {
        (Some(_), Some(_)) => {
            errors.push("metadata must have either content or parts, not both".to_string());
        }
        (None, None) => {
            errors.push("metadata must have content or parts".to_string());
        }
        (Some(content), None) => {
            if !content.as_str().is_some_and(|s| !is_blank(s)) {
                errors.push("metadata.content must be a non-empty string".to_string());
            }
        }
        (None, Some(parts)) => match parts.as_array() {
            Some(parts) if !parts.is_empty() => {
                for (i, part) in parts.iter().enumerate() {
                    if let Err(message) = check_part(part) {
                        errors.push(format!("metadata.parts[{i}]: {message}"));
                    }
                }
            }
            _ => errors.push("metadata.parts must be a non-empty array".to_string()),
        },
    }

    errors
}

fn check_part(part: &Value) -> Result<(), String> {
    let typed: WarningPart = serde_json::from_value(part.clone()).map_err(|e| {
        format!("expected a text part {{content}} or a link part {{text, href, external}}: {e}")
    })?;
    match typed {
        WarningPart::Text { content } if is_blank(&content) => {
            Err("text part content must be non-empty".to_string())
        }
        WarningPart::Link { text, href, .. } if is_blank(&text) || is_blank(&href) => {
            Err("link part text and href must be non-empty".to_string())
        }
        _ => Ok(()),
    }
}
