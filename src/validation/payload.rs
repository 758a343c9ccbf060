//! Checks for the string-encoded `data` payload of price records
//!
//! The payload is parsed first, validated against the sub-schema for the
//! record's mechanism, and then checked for the relations a schema cannot
//! express.

use serde_json::Value;

use super::schemas::{SchemaKind, SchemaSet};

/// Parse `data`, which must hold a JSON object
pub fn parse(data: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(data) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("data must encode a JSON object".to_string()),
        Err(e) => Err(format!("failed to parse data: {e}")),
    }
}

/// `"1"` followed by `decimals` zeros: the unit amount passed to the rate
/// function.
pub fn unit_amount(decimals: u64) -> String {
    format!("1{}", "0".repeat(decimals as usize))
}

pub fn expected_abi(function: &str) -> String {
    format!("function {function}(uint256) view returns (uint256)")
}

/// The argument value must be one whole unit and the ABI must describe the
/// called function. Missing fields are left to the schema.
fn exchange_rate_relations(payload: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(decimals) = payload
        .get("decimals")
        .and_then(Value::as_u64)
        .filter(|d| *d <= 18)
        && let Some(value) = payload
            .pointer("/args/0/value")
            .and_then(Value::as_str)
    {
        let expected = unit_amount(decimals);
        if value != expected {
            errors.push(format!(
                "data.args[0].value: expected {expected} \
                 (1 followed by {decimals} zeros), got {value}"
            ));
        }
    }

    if let Some(function) = payload.get("function").and_then(Value::as_str) {
        let abi = payload.get("abi").and_then(Value::as_str).unwrap_or_default();
        let expected = expected_abi(function);
        if abi != expected {
            errors.push(format!("data.abi: expected '{expected}', got '{abi}'"));
        }
    }

    errors
}

fn schema_errors(schemas: &SchemaSet, kind: SchemaKind, payload: &Value) -> Vec<String> {
    schemas
        .errors(kind, payload)
        .into_iter()
        .map(|e| {
            if e.starts_with('/') {
                format!("data{e}")
            } else {
                format!("data: {e}")
            }
        })
        .collect()
}

/// Payload of an `exchange-rates.json` record (or any `exchange_rate` record)
pub fn check_exchange_rate(schemas: &SchemaSet, data: &str) -> Vec<String> {
    let payload = match parse(data) {
        Ok(payload) => payload,
        Err(e) => return vec![e],
    };
    let mut errors = schema_errors(schemas, SchemaKind::ExchangeRateData, &payload);
    errors.extend(exchange_rate_relations(&payload));
    errors
}

pub fn check_spot_price(schemas: &SchemaSet, data: &str) -> Vec<String> {
    match parse(data) {
        Ok(payload) => schema_errors(schemas, SchemaKind::SpotPriceData, &payload),
        Err(e) => vec![e],
    }
}

/// Payload of an `oracle-prices.json` record. `exchange_rate` records also
/// need a function and ABI, and `convertToAssets` takes the unit amount.
pub fn check_oracle_price(
    schemas: &SchemaSet,
    source_type: Option<&str>,
    data: &str,
) -> Vec<String> {
    let payload = match parse(data) {
        Ok(payload) => payload,
        Err(e) => return vec![e],
    };
    let mut errors = schema_errors(schemas, SchemaKind::OraclePriceData, &payload);

    if source_type == Some("exchange_rate") {
        let non_empty = |field: &str| {
            payload
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !non_empty("abi") {
            errors.push("data.abi: required for exchange_rate".to_string());
        }
        if !non_empty("function") {
            errors.push("data.function: required for exchange_rate".to_string());
        }
        let function = payload.get("function").and_then(Value::as_str);
        let has_args = payload.get("args").is_some_and(Value::is_array);
        if function == Some("convertToAssets") && !has_args {
            errors.push("data.args: required array for convertToAssets".to_string());
        }
        if has_args && non_empty("abi") {
            errors.extend(exchange_rate_relations(&payload));
        }
    }

    errors
}
