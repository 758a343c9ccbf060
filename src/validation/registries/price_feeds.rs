use serde_json::Value;

use crate::chains;
use crate::loader::{Record, Registries, Registry};
use crate::models::Vendor;
use crate::validation::payload;
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{
    DuplicateTracker, address_key, check_address, check_chain, is_blank, locate,
};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

const TOKEN_SIDES: [&str; 2] = ["tokenIn", "tokenOut"];

pub fn validate_feeds(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let scope = chains::PRICE_FEEDS;
    let records: Vec<&Record> = registries.scoped(Registry::PriceFeeds, &scope).collect();

    let mut checksum = CheckOutcome::schema(Registry::PriceFeeds, "checksum");
    let mut chain_ids = CheckOutcome::schema(Registry::PriceFeeds, "chain-ids");
    let mut strings = CheckOutcome::schema(Registry::PriceFeeds, "strings");
    let mut vendors = CheckOutcome::schema(Registry::PriceFeeds, "vendor");
    let mut token_chains = CheckOutcome::schema(Registry::PriceFeeds, "token-chains");
    let mut payloads = CheckOutcome::schema(Registry::PriceFeeds, "payload");

    for record in &records {
        let location = locate(record, "address");
        let feed_chain = record.u64_field("chainId");

        checksum.tick();
        if let Some(address) = record.str_field("address") {
            check_address(&mut checksum, &location, "address", address);
        }
        chain_ids.tick();
        check_chain(&mut chain_ids, &scope, &location, "chainId", &record.value);

        for side in TOKEN_SIDES {
            let Some(token) = record.value.get(side) else {
                continue;
            };
            if let Some(address) = token.get("address").and_then(Value::as_str) {
                check_address(&mut checksum, &location, &format!("{side}.address"), address);
            }
            if let Some(token_chain) = token.get("chainId").and_then(Value::as_u64) {
                if !scope.is_valid(token_chain) {
                    chain_ids.push(
                        &location,
                        format!(
                            "invalid {side}.chainId {token_chain}, expected one of: {}",
                            scope.valid_list()
                        ),
                    );
                }
                token_chains.tick();
                if let Some(feed_chain) = feed_chain
                    && feed_chain != token_chain
                {
                    token_chains.push(
                        &location,
                        format!("feed chainId is {feed_chain} but {side}.chainId is {token_chain}"),
                    );
                }
            }
        }

        strings.tick();
        for field in ["vendor", "description"] {
            if let Some(value) = record.str_field(field)
                && is_blank(value)
            {
                strings.push(&location, format!("{field} must be a non-empty string"));
            }
        }
        match record.value.get("pair") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) if items.is_empty() => {
                strings.push(&location, "pair must not be empty");
            }
            Some(Value::Array(items)) => {
                if !items.iter().all(|item| item.as_str().is_some_and(|s| !is_blank(s))) {
                    strings.push(
                        &location,
                        format!(
                            "pair elements must be non-empty strings: {}",
                            Value::Array(items.clone())
                        ),
                    );
                }
            }
            Some(other) => strings.push(&location, format!("pair must be an array, got {other}")),
        }

        if let Some(vendor) = record.str_field("vendor").filter(|v| !is_blank(v)) {
            vendors.tick();
            if let Err(message) = vendor.parse::<Vendor>() {
                vendors.push(&location, message);
            }
        }

        if record.str_field("type") == Some("exchange_rate")
            && let Some(data) = record.str_field("data")
        {
            payloads.tick();
            for message in payload::check_exchange_rate(schemas, data) {
                payloads.push(&location, message);
            }
        }
    }

    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::PriceFeed,
            Registry::PriceFeeds,
            "address",
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        strings,
        vendors,
        token_chains,
        payloads,
    ]
}

pub fn validate_oracle_vaults(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let scope = chains::ORACLE_VAULTS;
    let records: Vec<&Record> = registries.scoped(Registry::OracleVaults, &scope).collect();

    let mut checksum = CheckOutcome::schema(Registry::OracleVaults, "checksum");
    let mut chain_ids = CheckOutcome::schema(Registry::OracleVaults, "chain-ids");
    let mut unique = CheckOutcome::schema(Registry::OracleVaults, "unique");
    let mut vendors = CheckOutcome::schema(Registry::OracleVaults, "vendor");
    let mut pairs = CheckOutcome::schema(Registry::OracleVaults, "pair");
    let mut seen = DuplicateTracker::new();

    for record in &records {
        let location = locate(record, "address");
        let address = record.str_field("address");

        if let Some(address) = address {
            checksum.tick();
            check_address(&mut checksum, &location, "address", address);
        }
        chain_ids.tick();
        check_chain(&mut chain_ids, &scope, &location, "chainId", &record.value);

        if let (Some(address), Some(chain_id)) = (address, record.u64_field("chainId")) {
            unique.tick();
            if let Some(first) = seen.observe(address_key(chain_id, address), record.index) {
                unique.push(&location, format!("duplicate of index {first} for chain {chain_id}"));
            }
        }

        if let Some(vendor) = record.str_field("vendor") {
            vendors.tick();
            if is_blank(vendor) {
                vendors.push(&location, "vendor must be a non-empty string");
            } else if let Err(message) = vendor.parse::<Vendor>() {
                vendors.push(&location, message);
            }
        }

        if let Some(items) = record.value.get("pair").and_then(Value::as_array) {
            pairs.tick();
            if items.len() != 2 {
                let message = format!("pair must have exactly 2 elements, got {}", items.len());
                pairs.push(&location, message);
            } else {
                for (position, item) in items.iter().enumerate() {
                    if !item.as_str().is_some_and(|s| !is_blank(s)) {
                        pairs.push(
                            &location,
                            format!("pair[{position}] must be a non-empty string, got {item}"),
                        );
                    }
                }
            }
        }
    }

    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::OracleVault,
            Registry::OracleVaults,
            "address",
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        unique,
        vendors,
        pairs,
    ]
}
