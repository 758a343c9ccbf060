use serde_json::Value;

use crate::chains::VALID_CHAIN_IDS;
use crate::loader::{Record, Registries, Registry};
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{DuplicateTracker, check_address, is_blank, locate};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

pub const CURATOR_IMAGE_PREFIX: &str = "https://cdn.morpho.org/v2/assets/images";

fn label(record: &Record) -> String {
    match record.str_field("name") {
        Some(name) => format!("index {} (curator: {name})", record.index),
        None => locate(record, "id"),
    }
}

pub fn validate(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::Curators;
    let records: Vec<&Record> = registries.records(registry).iter().collect();

    let mut unique = CheckOutcome::schema(registry, "unique");
    let mut verified = CheckOutcome::schema(registry, "verified");
    let mut chain_ids = CheckOutcome::schema(registry, "chain-ids");
    let mut checksum = CheckOutcome::schema(registry, "checksum");
    let mut images = CheckOutcome::schema(registry, "image");
    let mut urls = CheckOutcome::schema(registry, "url");
    let mut ids = DuplicateTracker::new();
    let mut names = DuplicateTracker::new();

    for record in &records {
        let location = label(record);

        unique.tick();
        if let Some(id) = record.str_field("id")
            && let Some(first) = ids.observe(id.to_string(), record.index)
        {
            unique.push(&location, format!("duplicate id '{id}' (first used at index {first})"));
        }
        if let Some(name) = record.str_field("name")
            && let Some(first) = names.observe(name.to_string(), record.index)
        {
            unique.push(
                &location,
                format!("duplicate name '{name}' (first used at index {first})"),
            );
        }

        verified.tick();
        if record.value.get("verified") != Some(&Value::Bool(true)) {
            verified.push(&location, "verified must be true");
        }

        if let Some(addresses) = record.value.get("addresses").and_then(Value::as_object) {
            for (chain, list) in addresses {
                chain_ids.tick();
                let valid = chain
                    .parse::<u64>()
                    .is_ok_and(|id| VALID_CHAIN_IDS.contains(&id));
                if !valid {
                    chain_ids.push(&location, format!("invalid chain id key '{chain}'"));
                }
                for address in list.as_array().into_iter().flatten().filter_map(Value::as_str) {
                    checksum.tick();
                    let field = format!("addresses.{chain}");
                    check_address(&mut checksum, &location, &field, address);
                }
            }
        }

        images.tick();
        urls.tick();
        let image = record.str_field("image").filter(|i| !is_blank(i));
        let url = record
            .value
            .pointer("/socials/url")
            .and_then(Value::as_str)
            .filter(|u| !is_blank(u));
        if record.value.get("hidden") == Some(&Value::Bool(true)) {
            if image.is_some() || url.is_some() {
                images.push(&location, "hidden curator must have an empty image and url");
            }
            continue;
        }

        match image {
            None => images.push(&location, "image must be a non-empty URL"),
            Some(image) if !image.starts_with(CURATOR_IMAGE_PREFIX) => images.push(
                &location,
                format!("image {image} must start with {CURATOR_IMAGE_PREFIX}"),
            ),
            Some(_) => {}
        }
        if url.is_none() {
            urls.push(&location, "socials.url must be a non-empty URL");
        }
    }

    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::Curator,
            registry,
            "id",
            records.iter().copied(),
        ),
        unique,
        verified,
        chain_ids,
        checksum,
        images,
        urls,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn curator(name: &str, extra: Value) -> Value {
        let mut curator = json!({
            "id": name.to_lowercase(),
            "name": name,
            "verified": true,
            "addresses": {"1": ["0x9E33faAE38ff641094fa68c65c2cE600b3410585"]},
            "image": "https://cdn.morpho.org/v2/assets/images/gauntlet.svg",
            "socials": {"url": "https://gauntlet.xyz"}
        });
        if let (Some(curator), Some(extra)) = (curator.as_object_mut(), extra.as_object()) {
            curator.extend(extra.clone());
        }
        curator
    }

    fn outcomes(values: Vec<Value>) -> Vec<CheckOutcome> {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Record { index, value })
            .collect();
        let registries =
            Registries::new(BTreeMap::from([(Registry::Curators, records)]), json!({}));
        validate(&SchemaSet::compile().unwrap(), &registries)
    }

    fn violations(outcomes: &[CheckOutcome], check: &str) -> Vec<String> {
        outcomes
            .iter()
            .find(|o| o.check == check)
            .map(|o| o.violations.iter().map(|v| v.location.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_listed_curator_needs_image_and_url() {
        let outcomes = outcomes(vec![
            curator("Gauntlet", json!({})),
            curator("Steakhouse", json!({"image": ""})),
            curator("Re7", json!({"image": "https://example.com/re7.svg"})),
            curator("MEV Capital", json!({"socials": {"url": " "}})),
            curator("Block Analitica", json!({"socials": {}})),
        ]);

        let images = violations(&outcomes, "curators/image");
        assert_eq!(images.len(), 2, "{images:?}");
        assert!(images[0].contains("Steakhouse"));
        assert!(images[1].contains("Re7"));

        let urls = violations(&outcomes, "curators/url");
        assert_eq!(urls.len(), 2, "{urls:?}");
        assert!(urls[0].contains("MEV Capital"));
        assert!(urls[1].contains("Block Analitica"));
    }

    #[test]
    fn test_hidden_curator_must_be_blank() {
        let blank = json!({"hidden": true, "image": "", "socials": {"url": ""}});
        let outcomes = outcomes(vec![
            curator("Hidden", blank),
            curator("Leaky", json!({"hidden": true, "image": ""})),
        ]);

        let images = violations(&outcomes, "curators/image");
        assert_eq!(images.len(), 1, "{images:?}");
        assert!(images[0].contains("Leaky"));
        assert!(violations(&outcomes, "curators/url").is_empty());
    }
}
