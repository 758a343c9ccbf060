use anyhow::Result;
use tracing::{debug, info};

use crate::loader::{Registries, Registry};

use super::consistency;
use super::registries::validate_registry;
use super::report::{CheckOutcome, ValidationReport};
use super::schemas::SchemaSet;

pub struct Validator {
    schemas: SchemaSet,
}

impl Validator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schemas: SchemaSet::compile()?,
        })
    }

    /// Run every check of one registry
    pub fn validate_registry(
        &self,
        registry: Registry,
        registries: &Registries,
    ) -> Vec<CheckOutcome> {
        debug!("Validating {registry}...");
        let outcomes = validate_registry(registry, &self.schemas, registries);
        log_outcomes(&outcomes);
        outcomes
    }

    /// Schema validators for every registry, then the cross-registry checks
    pub fn validate_all(&self, registries: &Registries) -> ValidationReport {
        let mut report = ValidationReport::new();

        for registry in Registry::ALL {
            report.extend(self.validate_registry(registry, registries));
        }

        debug!("Validating cross-registry references...");
        let references = consistency::validate(registries);
        log_outcomes(&references);
        report.extend(references);

        report
    }
}

fn log_outcomes(outcomes: &[CheckOutcome]) {
    for outcome in outcomes {
        if outcome.passed() {
            info!("✓ {} ({} checked)", outcome.check, outcome.checked);
        } else {
            debug!(
                "✗ {}: {} violation(s)",
                outcome.check,
                outcome.violations.len()
            );
        }
    }
}
