pub mod consistency;
mod payload;
mod registries;
pub mod report;
mod rules;
mod schema_check;
mod schemas;
mod validator;

#[cfg(test)]
mod tests;

// Re-export the main Validator
pub use registries::ALLOWED_TAGS;
pub use report::{Category, CheckOutcome, ValidationFailed, ValidationReport, Violation};
pub use validator::Validator;
