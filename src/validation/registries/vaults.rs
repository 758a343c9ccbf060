use crate::loader::{Record, Registries, Registry};
use crate::validation::report::CheckOutcome;
use crate::validation::rules::{DuplicateTracker, address_key, check_address, locate};
use crate::validation::schema_check;
use crate::validation::schemas::{SchemaKind, SchemaSet};

/// Shared by the v1 and v2 listings; they differ only in their schema.
pub fn validate(
    schemas: &SchemaSet,
    registries: &Registries,
    registry: Registry,
) -> Vec<CheckOutcome> {
    let kind = match registry {
        Registry::VaultsV2 => SchemaKind::VaultV2,
        _ => SchemaKind::Vault,
    };
    let records: Vec<&Record> = registries.records(registry).iter().collect();

    let mut checksum = CheckOutcome::schema(registry, "checksum");
    let mut unique = CheckOutcome::schema(registry, "unique");
    let mut seen = DuplicateTracker::new();

    for record in &records {
        let location = locate(record, "address");
        let Some(address) = record.str_field("address") else {
            continue;
        };
        checksum.tick();
        check_address(&mut checksum, &location, "address", address);

        if let Some(chain_id) = record.u64_field("chainId") {
            unique.tick();
            if let Some(first) = seen.observe(address_key(chain_id, address), record.index) {
                unique.push(&location, format!("duplicate of index {first} for chain {chain_id}"));
            }
        }
    }

    vec![
        schema_check::check_records(schemas, kind, registry, "address", records.iter().copied()),
        checksum,
        unique,
    ]
}
