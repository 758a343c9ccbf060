//! `exchange-rates.json`, `spot-prices.json` and `oracle-prices.json` share a
//! record layout and most of their checks.

use crate::chains::{self, ChainScope};
use crate::loader::{Record, Registries, Registry};
use crate::models::oracle::{ORACLE_PRICE_TYPES, SPOT_PRICE_TYPES};
use crate::validation::payload;
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{
    DuplicateTracker, OrderedEntry, address_key, check_address, check_chain, check_order_sequences,
    locate,
};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

const KEY_FIELD: &str = "assetAddress";

/// Checksums of both addresses and validity of both chain ids
fn check_addresses_and_chains(
    registry: Registry,
    scope: &ChainScope,
    records: &[&Record],
) -> [CheckOutcome; 2] {
    let mut checksum = CheckOutcome::schema(registry, "checksum");
    let mut chain_ids = CheckOutcome::schema(registry, "chain-ids");

    for record in records {
        let location = locate(record, KEY_FIELD);
        checksum.tick();
        for field in ["assetAddress", "contractAddress"] {
            if let Some(address) = record.str_field(field) {
                check_address(&mut checksum, &location, field, address);
            }
        }
        chain_ids.tick();
        for field in ["assetChainId", "contractChainId"] {
            check_chain(&mut chain_ids, scope, &location, field, &record.value);
        }
    }

    [checksum, chain_ids]
}

fn check_types(registry: Registry, allowed: &[&str], records: &[&Record]) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(registry, "type");
    for record in records {
        let Some(source_type) = record.str_field("type") else {
            continue;
        };
        outcome.tick();
        if !allowed.contains(&source_type) {
            outcome.push(
                locate(record, KEY_FIELD),
                format!("invalid type '{source_type}', expected one of: {}", allowed.join(", ")),
            );
        }
    }
    outcome
}

fn check_orders(registry: Registry, records: &[&Record]) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(registry, "order");
    let entries = records.iter().filter_map(|record| {
        Some(OrderedEntry {
            index: record.index,
            chain_id: record.u64_field("assetChainId")?,
            asset: record.str_field("assetAddress")?,
            order: record.value.get("order")?.as_i64()?,
        })
    });
    check_order_sequences(&mut outcome, entries);
    outcome
}

fn check_payloads(
    registry: Registry,
    records: &[&Record],
    check: impl Fn(&Record, &str) -> Vec<String>,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(registry, "payload");
    for record in records {
        let Some(data) = record.str_field("data") else {
            continue;
        };
        outcome.tick();
        let location = locate(record, KEY_FIELD);
        for message in check(record, data) {
            outcome.push(location.clone(), message);
        }
    }
    outcome
}

pub fn validate_exchange_rates(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::ExchangeRates;
    let scope = chains::PRICE_SOURCES;
    let records: Vec<&Record> = registries.scoped(registry, &scope).collect();

    let mut unique = CheckOutcome::schema(registry, "unique");
    let mut seen = DuplicateTracker::new();
    for record in &records {
        let (Some(asset_chain), Some(contract_chain), Some(asset), Some(contract)) = (
            record.u64_field("assetChainId"),
            record.u64_field("contractChainId"),
            record.str_field("assetAddress"),
            record.str_field("contractAddress"),
        ) else {
            continue;
        };
        unique.tick();
        let key = (
            address_key(asset_chain, asset),
            address_key(contract_chain, contract),
        );
        if let Some(first) = seen.observe(key, record.index) {
            unique.push(
                locate(record, KEY_FIELD),
                format!(
                    "duplicate of index {first}: same asset/contract pair \
                     on chains {asset_chain}/{contract_chain}"
                ),
            );
        }
    }

    let [checksum, chain_ids] = check_addresses_and_chains(registry, &scope, &records);
    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::PriceSource,
            registry,
            KEY_FIELD,
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        check_payloads(registry, &records, |_, data| {
            payload::check_exchange_rate(schemas, data)
        }),
        unique,
    ]
}

pub fn validate_spot_prices(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::SpotPrices;
    let scope = chains::PRICE_SOURCES;
    let records: Vec<&Record> = registries.scoped(registry, &scope).collect();

    let [checksum, chain_ids] = check_addresses_and_chains(registry, &scope, &records);
    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::OrderedPriceSource,
            registry,
            KEY_FIELD,
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        check_types(registry, SPOT_PRICE_TYPES, &records),
        check_payloads(registry, &records, |_, data| {
            payload::check_spot_price(schemas, data)
        }),
        check_orders(registry, &records),
    ]
}

pub fn validate_oracle_prices(schemas: &SchemaSet, registries: &Registries) -> Vec<CheckOutcome> {
    let registry = Registry::OraclePrices;
    let scope = chains::ORACLE_PRICES;
    let records: Vec<&Record> = registries.scoped(registry, &scope).collect();

    let [checksum, chain_ids] = check_addresses_and_chains(registry, &scope, &records);
    vec![
        schema_check::check_records(
            schemas,
            SchemaKind::OrderedPriceSource,
            registry,
            KEY_FIELD,
            records.iter().copied(),
        ),
        checksum,
        chain_ids,
        check_types(registry, ORACLE_PRICE_TYPES, &records),
        check_payloads(registry, &records, |record, data| {
            payload::check_oracle_price(schemas, record.str_field("type"), data)
        }),
        check_orders(registry, &records),
    ]
}
