use super::{Category, Validator};
use crate::loader::{Record, Registries, Registry};
use serde_json::{Value, json};
use std::collections::BTreeMap;

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

fn records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| Record { index, value })
        .collect()
}

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

fn registries(entries: Vec<(Registry, Vec<Value>)>) -> Registries {
    let mut map: BTreeMap<Registry, Vec<Record>> = Registry::ALL
        .into_iter()
        .filter(|r| r.is_record_array())
        .map(|r| (r, Vec::new()))
        .collect();
    for (registry, values) in entries {
        map.insert(registry, records(values));
    }
    Registries::new(map, json!({}))
}

#[test]
fn test_validator_creation() {
    assert!(Validator::new().is_ok());
}

#[test]
fn test_clean_registries_pass() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![(
        Registry::Tokens,
        vec![token(USDC, "USDC"), token(WETH, "WETH")],
    )]));

    let failed: Vec<_> = report.failed().map(|o| o.check.clone()).collect();
    assert!(report.is_success(), "unexpected failures: {failed:?}");
    assert_eq!(report.get("tokens/unique").unwrap().checked, 2);
}

#[test]
fn test_duplicate_token_in_different_case() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![(
        Registry::Tokens,
        vec![token(USDC, "USDC"), token(&USDC.to_lowercase(), "USDC")],
    )]));

    let unique = report.get("tokens/unique").unwrap();
    assert_eq!(unique.violations.len(), 1);
    assert!(unique.violations[0].location.starts_with("index 1"));
    assert!(unique.violations[0].message.contains("duplicate of index 0"));
}

#[test]
fn test_exchange_rate_feed_with_wrong_unit_amount() {
    let data = json!({
        "decimals": 6,
        "args": [{"type": "bigint", "value": "100000"}],
        "abi": "function x(uint256) view returns (uint256)",
        "function": "x"
    })
    .to_string();
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![
        (Registry::Tokens, vec![token(USDC, "USDC"), token(WETH, "WETH")]),
        (
            Registry::PriceFeeds,
            vec![json!({
                "chainId": 1,
                "address": USDC,
                "vendor": "Chainlink",
                "description": "USDC exchange rate",
                "type": "exchange_rate",
                "data": data
            })],
        ),
    ]));

    let payload = report.get("price-feeds/payload").unwrap();
    assert_eq!(payload.violations.len(), 1, "{:?}", payload.violations);
    assert!(payload.violations[0].message.contains("1000000"));
    assert!(!report.is_success());
}

#[test]
fn test_warning_with_content_and_parts() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![(
        Registry::CustomWarnings,
        vec![json!({
            "marketId": "0xb323495f7e4148be5643a4ea4a8221eef163e4bccfdedc2a6f4696baacbc86cc",
            "chainId": 1,
            "level": "YELLOW",
            "metadata": {
                "content": "foo",
                "parts": [{"type": "text", "content": "bar"}]
            }
        })],
    )]));

    let metadata = report.get("custom-warnings/metadata").unwrap();
    assert_eq!(metadata.violations.len(), 1);
    assert!(metadata.violations[0].message.contains("not both"));
}

#[test]
fn test_lowercase_placeholder_is_not_checksummed() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![(
        Registry::Tokens,
        vec![token("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee", "ETH")],
    )]));

    let checksum = report.get("tokens/checksum").unwrap();
    assert_eq!(checksum.violations.len(), 1);
    assert!(
        checksum.violations[0]
            .message
            .contains("should be 0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE")
    );
}

#[test]
fn test_dangling_feed_token_is_referential() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![
        (Registry::Tokens, vec![token(USDC, "USDC")]),
        (
            Registry::PriceFeeds,
            vec![json!({
                "chainId": 1,
                "address": USDC,
                "vendor": "Chainlink",
                "description": "WETH / USDC",
                "tokenIn": {"address": WETH, "chainId": 1},
                "tokenOut": {"address": USDC, "chainId": 1}
            })],
        ),
    ]));

    let counts = report.counts_by_category();
    assert_eq!(counts.get(&Category::Referential), Some(&1));
    assert_eq!(report.total_violations(), 1);
}

#[test]
fn test_report_fails_with_every_violation() {
    let validator = Validator::new().unwrap();
    let report = validator.validate_all(&registries(vec![(
        Registry::Tokens,
        vec![token(&USDC.to_lowercase(), "USDC"), token(&USDC.to_lowercase(), "USDC")],
    )]));

    // Two checksum failures plus one duplicate
    let failure = report.into_result().unwrap_err();
    assert_eq!(failure.total, 3);
}
