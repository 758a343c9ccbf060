//! One validator per registry
//!
//! Each validator reads the already-loaded records and returns one
//! [`CheckOutcome`] per logical check. None of them stop at the first bad
//! record.

mod curators;
mod points;
mod price_feeds;
mod price_sources;
mod tokens;
mod vaults;
mod warnings;

pub use tokens::ALLOWED_TAGS;

use crate::loader::{Registries, Registry};

use super::report::CheckOutcome;
use super::schemas::SchemaSet;

pub fn validate_registry(
    registry: Registry,
    schemas: &SchemaSet,
    registries: &Registries,
) -> Vec<CheckOutcome> {
    match registry {
        Registry::Tokens => tokens::validate(schemas, registries),
        Registry::PriceFeeds => price_feeds::validate_feeds(schemas, registries),
        Registry::OracleVaults => price_feeds::validate_oracle_vaults(schemas, registries),
        Registry::ExchangeRates => price_sources::validate_exchange_rates(schemas, registries),
        Registry::SpotPrices => price_sources::validate_spot_prices(schemas, registries),
        Registry::OraclePrices => price_sources::validate_oracle_prices(schemas, registries),
        Registry::Curators => curators::validate(schemas, registries),
        Registry::Vaults => vaults::validate(schemas, registries, Registry::Vaults),
        Registry::VaultsV2 => vaults::validate(schemas, registries, Registry::VaultsV2),
        Registry::CustomWarnings => warnings::validate(schemas, registries),
        Registry::Points => points::validate(schemas, registries),
    }
}
