use crate::address::{is_market_id, verify_checksum};
use crate::chains::VALID_CHAIN_IDS;
use crate::loader::{Registries, Registry};
use crate::models::{EntityKind, Point, PointsMapping};
use crate::validation::report::CheckOutcome;
use crate::validation::rules::is_blank;
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

pub fn validate(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::Points;
    let mut outcomes = vec![schema_check::check_document(
        schemas,
        SchemaKind::Points,
        registry,
        registries.points_value(),
    )];

    // Layout problems were reported above
    let Some(points) = registries.points() else {
        return outcomes;
    };
    outcomes.push(check_entries(&points));
    outcomes.push(check_keys(&points));
    outcomes
}

/// Every point needs a title and a label; a link, when given, must not be
/// empty.
pub fn check_entries(points: &PointsMapping) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(Registry::Points, "entries");
    for entry in points.entries() {
        outcome.tick();
        let Point {
            title, label, link, ..
        } = entry.point;
        for (field, value) in [("title", title), ("label", label)] {
            match value {
                None => outcome.push(entry.to_string(), format!("is missing a {field}")),
                Some(v) if is_blank(v) => {
                    outcome.push(entry.to_string(), format!("has an empty {field}"))
                }
                Some(_) => {}
            }
        }
        if link.as_deref().is_some_and(is_blank) {
            outcome.push(entry.to_string(), "has an empty link");
        }
    }
    outcome
}

/// Chain keys must be known chain ids; entity keys must be checksummed
/// addresses or market ids depending on the mapping.
pub fn check_keys(points: &PointsMapping) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(Registry::Points, "keys");
    let mut reported_chains = std::collections::BTreeSet::new();

    for (map, chain, key) in points.keys() {
        outcome.tick();
        let valid_chain = chain
            .parse::<u64>()
            .is_ok_and(|id| VALID_CHAIN_IDS.contains(&id));
        if !valid_chain && reported_chains.insert((map, chain)) {
            let location = format!("{map} → chain {chain}");
            outcome.push(location, "chain key is not a supported chain id");
        }

        let location = format!("{map} → chain {chain} → {key}");
        match map.key_kind() {
            EntityKind::Market => {
                if !is_market_id(key) {
                    outcome.push(location, "market key must be 0x followed by 64 hex characters");
                }
            }
            EntityKind::Vault | EntityKind::Token => {
                if let Err(message) = verify_checksum(key) {
                    outcome.push(location, message);
                }
            }
        }
    }
    outcome
}
