//! Reads registry documents from the data directory
//!
//! Loading is all-or-nothing per registry: a missing file or a document that
//! is not valid JSON aborts the run. Shape problems inside records are left to
//! the validators.

pub mod context;
mod error;

pub use error::LoadError;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chains::ChainScope;
use crate::models::PointsMapping;

/// Every registry document reglint knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Registry {
    Tokens,
    PriceFeeds,
    OracleVaults,
    ExchangeRates,
    SpotPrices,
    OraclePrices,
    Curators,
    Vaults,
    VaultsV2,
    CustomWarnings,
    Points,
}

impl Registry {
    pub const ALL: [Registry; 11] = [
        Registry::Tokens,
        Registry::PriceFeeds,
        Registry::OracleVaults,
        Registry::ExchangeRates,
        Registry::SpotPrices,
        Registry::OraclePrices,
        Registry::Curators,
        Registry::Vaults,
        Registry::VaultsV2,
        Registry::CustomWarnings,
        Registry::Points,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Registry::Tokens => "tokens.json",
            Registry::PriceFeeds => "price-feeds.json",
            Registry::OracleVaults => "oracle-vaults.json",
            Registry::ExchangeRates => "exchange-rates.json",
            Registry::SpotPrices => "spot-prices.json",
            Registry::OraclePrices => "oracle-prices.json",
            Registry::Curators => "curators-listing.json",
            Registry::Vaults => "vaults-listing.json",
            Registry::VaultsV2 => "vaults-v2-listing.json",
            Registry::CustomWarnings => "custom-warnings.json",
            Registry::Points => "points.json",
        }
    }

    /// Short name used to prefix check names
    pub fn name(self) -> &'static str {
        match self {
            Registry::Tokens => "tokens",
            Registry::PriceFeeds => "price-feeds",
            Registry::OracleVaults => "oracle-vaults",
            Registry::ExchangeRates => "exchange-rates",
            Registry::SpotPrices => "spot-prices",
            Registry::OraclePrices => "oracle-prices",
            Registry::Curators => "curators",
            Registry::Vaults => "vaults",
            Registry::VaultsV2 => "vaults-v2",
            Registry::CustomWarnings => "custom-warnings",
            Registry::Points => "points",
        }
    }

    /// Whether the document is a top-level array of records
    pub fn is_record_array(self) -> bool {
        !matches!(self, Registry::Points)
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// One element of a registry array, remembering its position in the file
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: usize,
    pub value: Value,
}

impl Record {
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.value.get(field).and_then(Value::as_str)
    }

    pub fn u64_field(&self, field: &str) -> Option<u64> {
        self.value.get(field).and_then(Value::as_u64)
    }

    /// Deserialize into a typed record; `None` when the shape does not fit
    /// (the schema checks report why).
    pub fn typed<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.value.clone()).ok()
    }
}

pub struct RegistryLoader {
    data_dir: PathBuf,
}

impl RegistryLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_of(&self, registry: Registry) -> PathBuf {
        self.data_dir.join(registry.file_name())
    }

    /// Read and parse a JSON document from the data directory by file name
    pub fn load_document(&self, file_name: &str) -> Result<Value, LoadError> {
        let path = self.data_dir.join(file_name);
        if !path.is_file() {
            return Err(LoadError::NotFound { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        let value = serde_json::from_str(&content)
            .map_err(|e| LoadError::parse(&path, content, &e))?;
        debug!("Loaded {}", path.display());
        Ok(value)
    }

    pub fn load_value(&self, registry: Registry) -> Result<Value, LoadError> {
        self.load_document(registry.file_name())
    }

    /// Load an array registry as indexed records
    pub fn load_records(&self, registry: Registry) -> Result<Vec<Record>, LoadError> {
        match self.load_value(registry)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(index, value)| Record { index, value })
                .collect()),
            _ => Err(LoadError::Shape {
                path: self.path_of(registry),
                expected: "array",
            }),
        }
    }

    /// Load every registry of the data directory. Any missing or unparseable
    /// document aborts the whole load.
    pub fn load_all(&self) -> Result<Registries, LoadError> {
        let mut records = BTreeMap::new();
        for registry in Registry::ALL.into_iter().filter(|r| r.is_record_array()) {
            records.insert(registry, self.load_records(registry)?);
        }
        let points = self.load_value(Registry::Points)?;
        Ok(Registries { records, points })
    }
}

/// Every registry of one data directory, as loaded from disk
#[derive(Debug, Clone, Default)]
pub struct Registries {
    records: BTreeMap<Registry, Vec<Record>>,
    points: Value,
}

impl Registries {
    pub fn new(records: BTreeMap<Registry, Vec<Record>>, points: Value) -> Self {
        Self { records, points }
    }

    /// All records of an array registry, unfiltered
    pub fn records(&self, registry: Registry) -> &[Record] {
        self.records
            .get(&registry)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records of `registry` that fall inside `scope`
    pub fn scoped<'a>(
        &'a self,
        registry: Registry,
        scope: &'a ChainScope,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.records(registry)
            .iter()
            .filter(move |record| scope.admits(&record.value))
    }

    /// Records that deserialize into `T`, with their file index
    pub fn typed<T: DeserializeOwned>(&self, registry: Registry) -> Vec<(usize, T)> {
        self.records(registry)
            .iter()
            .filter_map(|record| Some((record.index, record.typed()?)))
            .collect()
    }

    pub fn points_value(&self) -> &Value {
        &self.points
    }

    /// `None` when points.json does not match the mapping layout
    pub fn points(&self) -> Option<PointsMapping> {
        serde_json::from_value(self.points.clone()).ok()
    }
}

#[cfg(test)]
mod tests;
