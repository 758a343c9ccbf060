//! Relationships between registries
//!
//! Reference sets are built from the full, unfiltered registries, so a feed
//! on a chain the token checks skip still resolves against its tokens.

use std::collections::HashSet;

use serde_json::Value;

use crate::loader::{Record, Registries, Registry};
use crate::models::{PointsMap, PointsMapping, WarningTarget};

use super::report::CheckOutcome;
use super::rules::{address_key, locate};

type KeySet = HashSet<(u64, String)>;

fn key_set<'a>(records: impl IntoIterator<Item = &'a Record>) -> KeySet {
    records
        .into_iter()
        .filter_map(|record| {
            Some(address_key(
                record.u64_field("chainId")?,
                record.str_field("address")?,
            ))
        })
        .collect()
}

/// Lookup sets shared by the consistency checks
pub struct ReferenceSets {
    pub tokens: KeySet,
    pub vaults: KeySet,
}

impl ReferenceSets {
    pub fn build(registries: &Registries) -> Self {
        Self {
            tokens: key_set(registries.records(Registry::Tokens)),
            vaults: key_set(
                registries
                    .records(Registry::Vaults)
                    .iter()
                    .chain(registries.records(Registry::VaultsV2)),
            ),
        }
    }

    pub fn has_token(&self, chain_id: u64, address: &str) -> bool {
        self.tokens.contains(&address_key(chain_id, address))
    }

    pub fn has_vault(&self, chain_id: u64, address: &str) -> bool {
        self.vaults.contains(&address_key(chain_id, address))
    }
}

pub fn validate(registries: &Registries) -> Vec<CheckOutcome> {
    let refs = ReferenceSets::build(registries);

    let mut outcomes = vec![
        feed_tokens(&refs, registries.records(Registry::PriceFeeds)),
        warning_vaults(&refs, registries.records(Registry::CustomWarnings)),
    ];
    if let Some(points) = registries.points() {
        outcomes.push(points_vaults(&refs, &points));
        outcomes.push(points_tokens(&refs, &points));
    }
    outcomes
}

/// `(chainId, address)` of a `{address, chainId}` reference held in `field`
fn token_ref<'a>(record: &'a Record, field: &str) -> Option<(u64, &'a str)> {
    let token = record.value.get(field)?;
    Some((
        token.get("chainId").and_then(Value::as_u64)?,
        token.get("address").and_then(Value::as_str)?,
    ))
}

/// `tokenIn` / `tokenOut` of every feed must be a listed token. Feeds are read
/// field by field so a schema error elsewhere in the record does not hide a
/// dangling reference.
pub fn feed_tokens(refs: &ReferenceSets, feeds: &[Record]) -> CheckOutcome {
    let mut outcome = CheckOutcome::referential("feed-tokens");
    for feed in feeds {
        for side in ["tokenIn", "tokenOut"] {
            let Some((chain_id, address)) = token_ref(feed, side) else {
                continue;
            };
            outcome.tick();
            if !refs.has_token(chain_id, address) {
                outcome.push(
                    format!("{} {}", Registry::PriceFeeds, locate(feed, "address")),
                    format!("{side} {address} on chain {chain_id} is not in {}", Registry::Tokens),
                );
            }
        }
    }
    outcome
}

/// Vault warnings must point at a listed vault
pub fn warning_vaults(refs: &ReferenceSets, warnings: &[Record]) -> CheckOutcome {
    let mut outcome = CheckOutcome::referential("warning-vaults");
    for warning in warnings {
        let Ok(WarningTarget::Vault(address)) = WarningTarget::of_value(&warning.value) else {
            continue;
        };
        let Some(chain_id) = warning.u64_field("chainId") else {
            continue;
        };
        outcome.tick();
        if !refs.has_vault(chain_id, address) {
            outcome.push(
                format!("{} index {} (vault: {address})", Registry::CustomWarnings, warning.index),
                format!(
                    "vault on chain {chain_id} is not in {} or {}",
                    Registry::Vaults,
                    Registry::VaultsV2
                ),
            );
        }
    }
    outcome
}

/// Keys of `vaultsWithPoints` must be listed vaults
pub fn points_vaults(refs: &ReferenceSets, points: &PointsMapping) -> CheckOutcome {
    check_point_keys(
        "points-vaults",
        points,
        &[PointsMap::VaultsWithPoints],
        |chain_id, key| refs.has_vault(chain_id, key),
        "is not in vaults-listing.json or vaults-v2-listing.json",
    )
}

/// Keys of the collateral-token mappings must be listed tokens
pub fn points_tokens(refs: &ReferenceSets, points: &PointsMapping) -> CheckOutcome {
    check_point_keys(
        "points-tokens",
        points,
        &[
            PointsMap::MarketsWithPointsOnCollateralToken,
            PointsMap::VaultsWithPointsOnMarketCollateralToken,
        ],
        |chain_id, key| refs.has_token(chain_id, key),
        "is not in tokens.json",
    )
}

fn check_point_keys(
    name: &str,
    points: &PointsMapping,
    maps: &[PointsMap],
    exists: impl Fn(u64, &str) -> bool,
    missing: &str,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::referential(name);
    for (map, chain, key) in points.keys().filter(|(map, ..)| maps.contains(map)) {
        // Non-numeric chain keys are reported by the points key check
        let Ok(chain_id) = chain.parse::<u64>() else {
            continue;
        };
        outcome.tick();
        if !exists(chain_id, key) {
            outcome.push(format!("{map} → chain {chain} → {key}"), missing);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    const VAULT: &str = "0xBEEF01735c132Ada46AA9aA4c54623cAA92A64CB";

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Record { index, value })
            .collect()
    }

    fn registries(points: serde_json::Value) -> Registries {
        let mut map = BTreeMap::new();
        map.insert(
            Registry::Tokens,
            records(vec![
                json!({"chainId": 1, "address": USDC}),
                json!({"chainId": 137, "address": WETH}),
            ]),
        );
        map.insert(Registry::Vaults, records(vec![json!({"chainId": 1, "address": VAULT})]));
        map.insert(
            Registry::PriceFeeds,
            records(vec![
                json!({
                    "chainId": 137,
                    "address": USDC,
                    "vendor": "Chainlink",
                    "description": "WETH / USDC",
                    "tokenIn": {"address": WETH, "chainId": 137},
                    "tokenOut": {"address": USDC, "chainId": 137}
                }),
            ]),
        );
        map.insert(
            Registry::CustomWarnings,
            records(vec![
                json!({
                    "vaultAddress": VAULT.to_lowercase(),
                    "chainId": 1,
                    "level": "RED",
                    "metadata": {"content": "x"}
                }),
                json!({
                    "vaultAddress": VAULT,
                    "chainId": 8453,
                    "level": "RED",
                    "metadata": {"content": "x"}
                }),
            ]),
        );
        Registries::new(map, points)
    }

    #[test]
    fn test_feed_tokens_resolve_on_their_own_chain() {
        let outcomes = validate(&registries(json!({})));
        let feeds = outcomes.iter().find(|o| o.check == "consistency/feed-tokens").unwrap();
        assert_eq!(feeds.checked, 2);
        assert_eq!(feeds.violations.len(), 1);
        let expected = format!("tokenOut {USDC} on chain 137");
        assert!(feeds.violations[0].message.starts_with(&expected));
    }

    #[test]
    fn test_warning_vaults_compare_case_insensitively() {
        let outcomes = validate(&registries(json!({})));
        let warnings = outcomes
            .iter()
            .find(|o| o.check == "consistency/warning-vaults")
            .unwrap();
        assert_eq!(warnings.checked, 2);
        assert_eq!(warnings.violations.len(), 1);
        assert!(warnings.violations[0].location.contains("index 1"));
    }

    #[test]
    fn test_references_checked_on_records_with_schema_errors() {
        let tokens = records(vec![json!({"chainId": 1, "address": USDC})]);
        // No description, and no level or metadata: both fail their schema
        let feeds = records(vec![json!({
            "chainId": 1,
            "address": USDC,
            "vendor": "Chainlink",
            "tokenIn": {"address": USDC, "chainId": 1},
            "tokenOut": {"address": WETH, "chainId": 1}
        })]);
        let warnings = records(vec![json!({"vaultAddress": VAULT, "chainId": 1})]);
        let registries = Registries::new(
            BTreeMap::from([
                (Registry::Tokens, tokens),
                (Registry::PriceFeeds, feeds),
                (Registry::CustomWarnings, warnings),
            ]),
            json!({}),
        );

        let outcomes = validate(&registries);
        let feeds = outcomes.iter().find(|o| o.check == "consistency/feed-tokens").unwrap();
        assert_eq!(feeds.checked, 2);
        assert_eq!(feeds.violations.len(), 1);
        assert!(feeds.violations[0].message.starts_with(&format!("tokenOut {WETH}")));

        let warnings = outcomes
            .iter()
            .find(|o| o.check == "consistency/warning-vaults")
            .unwrap();
        assert_eq!(warnings.checked, 1);
        assert_eq!(warnings.violations.len(), 1);
    }

    #[test]
    fn test_points_references() {
        let outcomes = validate(&registries(json!({
            "vaultsWithPoints": {"1": {VAULT: [], USDC: []}},
            "marketsWithPointsOnCollateralToken": {"1": {USDC: []}, "8453": {USDC: []}},
            "vaultsWithPointsOnMarketCollateralToken": {"137": {WETH: []}}
        })));
        let vaults = outcomes.iter().find(|o| o.check == "consistency/points-vaults").unwrap();
        assert_eq!(vaults.violations.len(), 1);
        assert!(vaults.violations[0].location.ends_with(USDC));

        let tokens = outcomes.iter().find(|o| o.check == "consistency/points-tokens").unwrap();
        assert_eq!(tokens.checked, 3);
        assert_eq!(tokens.violations.len(), 1);
        assert_eq!(
            tokens.violations[0].location,
            format!("marketsWithPointsOnCollateralToken → chain 8453 → {USDC}")
        );
    }
}
