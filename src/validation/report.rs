//! Violation accumulation and the aggregated failure report
//!
//! Checks never abort on bad data. Each one returns a [`CheckOutcome`]; the
//! caller merges them into a [`ValidationReport`], and only a report with zero
//! violations across every outcome counts as success.

use miette::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::loader::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Field presence, types, ranges, enums, checksums, uniqueness
    Schema,
    /// Dangling references between registries
    Referential,
    /// Remote lookups that failed or found nothing
    Remote,
    /// Entities found remotely but scored as risky
    Risk,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Schema => "schema",
            Category::Referential => "referential",
            Category::Remote => "remote",
            Category::Risk => "risk",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Where the offending data lives, e.g. `index 4 (address: 0x...)`
    pub location: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check: String,
    pub category: Category,
    /// Number of items the check looked at
    pub checked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    pub fn new(check: impl Into<String>, category: Category) -> Self {
        Self {
            check: check.into(),
            category,
            checked: 0,
            skipped: None,
            violations: Vec::new(),
        }
    }

    /// A schema-category check named `<registry>/<name>`
    pub fn schema(registry: Registry, name: &str) -> Self {
        Self::new(format!("{}/{name}", registry.name()), Category::Schema)
    }

    pub fn referential(name: &str) -> Self {
        Self::new(format!("consistency/{name}"), Category::Referential)
    }

    pub fn skipped(
        check: impl Into<String>,
        category: Category,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Self::new(check, category)
        }
    }

    pub fn push(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            location: location.into(),
            message: message.into(),
        });
    }

    /// Count one checked item
    pub fn tick(&mut self) {
        self.checked += 1;
    }

    pub fn with_checked(mut self, checked: usize) -> Self {
        self.checked = checked;
        self
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = CheckOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn total_violations(&self) -> usize {
        self.outcomes.iter().map(|o| o.violations.len()).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    pub fn get(&self, check: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    /// Violation counts per category, including categories with zero
    pub fn counts_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.category).or_insert(0) += outcome.violations.len();
        }
        counts
    }

    pub fn into_result(self) -> Result<Self, ValidationFailed> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ValidationFailed::from_report(&self))
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Validation failed: {total} violation(s) in {failed} check(s) ({by_category})")]
#[diagnostic(
    code(reglint::validation_failed),
    help("every violation above names the file index and the offending value")
)]
pub struct ValidationFailed {
    pub total: usize,
    pub failed: usize,
    pub by_category: String,
    #[related]
    pub checks: Vec<FailedCheck>,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{check} [{category}]: {count} violation(s)")]
pub struct FailedCheck {
    pub check: String,
    pub category: Category,
    pub count: usize,
    #[related]
    pub violations: Vec<ViolationDiagnostic>,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{location}: {message}")]
pub struct ViolationDiagnostic {
    pub location: String,
    pub message: String,
}

impl ValidationFailed {
    pub fn from_report(report: &ValidationReport) -> Self {
        let checks: Vec<FailedCheck> = report
            .failed()
            .map(|outcome| FailedCheck {
                check: outcome.check.clone(),
                category: outcome.category,
                count: outcome.violations.len(),
                violations: outcome
                    .violations
                    .iter()
                    .map(|v| ViolationDiagnostic {
                        location: v.location.clone(),
                        message: v.message.clone(),
                    })
                    .collect(),
            })
            .collect();

        let by_category = report
            .counts_by_category()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| format!("{category}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            total: report.total_violations(),
            failed: checks.len(),
            by_category,
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_succeeds() {
        let mut report = ValidationReport::new();
        report.extend([
            CheckOutcome::schema(Registry::Tokens, "checksum").with_checked(3),
            CheckOutcome::skipped("remote/markets", Category::Remote, "SKIP_MARKETS_API_TESTS"),
        ]);
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_failure_groups_by_check_and_category() {
        let mut checksum = CheckOutcome::schema(Registry::Tokens, "checksum");
        checksum.push("index 0 (address: 0xabc)", "bad checksum");
        checksum.push("index 2 (address: 0xdef)", "bad checksum");
        let mut refs = CheckOutcome::referential("feed-tokens");
        refs.push("price-feeds index 1", "tokenIn not in tokens.json");

        let mut report = ValidationReport::new();
        report.extend([checksum, refs, CheckOutcome::schema(Registry::Points, "entries")]);

        assert_eq!(report.total_violations(), 3);
        let counts = report.counts_by_category();
        assert_eq!(counts[&Category::Schema], 2);
        assert_eq!(counts[&Category::Referential], 1);

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.total, 3);
        assert_eq!(failure.failed, 2);
        assert_eq!(failure.checks[0].check, "tokens/checksum");
        assert_eq!(failure.checks[0].violations.len(), 2);
        assert_eq!(failure.by_category, "schema: 2, referential: 1");
        assert!(failure.to_string().contains("3 violation(s) in 2 check(s)"));
    }
}
