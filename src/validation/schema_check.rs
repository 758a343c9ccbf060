use serde_json::Value;

use crate::loader::{Record, Registry};

use super::report::CheckOutcome;
use super::rules::locate;
use super::schemas::{SchemaKind, SchemaSet};

/// Validate every record against the registry's JSON Schema, one violation per
/// schema error. Named `<registry>/fields`.
pub fn check_records<'a>(
    schemas: &SchemaSet,
    kind: SchemaKind,
    registry: Registry,
    key_field: &str,
    records: impl IntoIterator<Item = &'a Record>,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(registry, "fields");
    for record in records {
        outcome.tick();
        let location = locate(record, key_field);
        for error in schemas.errors(kind, &record.value) {
            outcome.push(location.clone(), error);
        }
    }
    outcome
}

/// Validate a whole document (e.g. `points.json`) against one schema
pub fn check_document(
    schemas: &SchemaSet,
    kind: SchemaKind,
    registry: Registry,
    document: &Value,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::schema(registry, "fields").with_checked(1);
    for error in schemas.errors(kind, document) {
        outcome.push(registry.file_name(), error);
    }
    outcome
}
