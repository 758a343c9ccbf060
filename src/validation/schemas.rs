use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

// Embed schemas at compile time
const DEFINITIONS_SCHEMA: &str = include_str!("../../schemas/v1/definitions.json");
const TOKEN_SCHEMA: &str = include_str!("../../schemas/v1/token.json");
const PRICE_FEED_SCHEMA: &str = include_str!("../../schemas/v1/price-feed.json");
const ORACLE_VAULT_SCHEMA: &str = include_str!("../../schemas/v1/oracle-vault.json");
const PRICE_SOURCE_SCHEMA: &str = include_str!("../../schemas/v1/price-source.json");
const ORDERED_PRICE_SOURCE_SCHEMA: &str =
    include_str!("../../schemas/v1/ordered-price-source.json");
const CURATOR_SCHEMA: &str = include_str!("../../schemas/v1/curator.json");
const VAULT_SCHEMA: &str = include_str!("../../schemas/v1/vault.json");
const VAULT_V2_SCHEMA: &str = include_str!("../../schemas/v1/vault-v2.json");
const CUSTOM_WARNING_SCHEMA: &str = include_str!("../../schemas/v1/custom-warning.json");
const POINTS_SCHEMA: &str = include_str!("../../schemas/v1/points.json");
const EXCHANGE_RATE_DATA_SCHEMA: &str = include_str!("../../schemas/v1/exchange-rate-data.json");
const SPOT_PRICE_DATA_SCHEMA: &str = include_str!("../../schemas/v1/spot-price-data.json");
const ORACLE_PRICE_DATA_SCHEMA: &str = include_str!("../../schemas/v1/oracle-price-data.json");

const SCHEMA_BASE: &str = "https://reglint.dev/schemas/v1/";

/// Every embedded schema, by file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Token,
    PriceFeed,
    OracleVault,
    PriceSource,
    OrderedPriceSource,
    Curator,
    Vault,
    VaultV2,
    CustomWarning,
    Points,
    ExchangeRateData,
    SpotPriceData,
    OraclePriceData,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 13] = [
        SchemaKind::Token,
        SchemaKind::PriceFeed,
        SchemaKind::OracleVault,
        SchemaKind::PriceSource,
        SchemaKind::OrderedPriceSource,
        SchemaKind::Curator,
        SchemaKind::Vault,
        SchemaKind::VaultV2,
        SchemaKind::CustomWarning,
        SchemaKind::Points,
        SchemaKind::ExchangeRateData,
        SchemaKind::SpotPriceData,
        SchemaKind::OraclePriceData,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SchemaKind::Token => "token.json",
            SchemaKind::PriceFeed => "price-feed.json",
            SchemaKind::OracleVault => "oracle-vault.json",
            SchemaKind::PriceSource => "price-source.json",
            SchemaKind::OrderedPriceSource => "ordered-price-source.json",
            SchemaKind::Curator => "curator.json",
            SchemaKind::Vault => "vault.json",
            SchemaKind::VaultV2 => "vault-v2.json",
            SchemaKind::CustomWarning => "custom-warning.json",
            SchemaKind::Points => "points.json",
            SchemaKind::ExchangeRateData => "exchange-rate-data.json",
            SchemaKind::SpotPriceData => "spot-price-data.json",
            SchemaKind::OraclePriceData => "oracle-price-data.json",
        }
    }

    fn source(self) -> &'static str {
        match self {
            SchemaKind::Token => TOKEN_SCHEMA,
            SchemaKind::PriceFeed => PRICE_FEED_SCHEMA,
            SchemaKind::OracleVault => ORACLE_VAULT_SCHEMA,
            SchemaKind::PriceSource => PRICE_SOURCE_SCHEMA,
            SchemaKind::OrderedPriceSource => ORDERED_PRICE_SOURCE_SCHEMA,
            SchemaKind::Curator => CURATOR_SCHEMA,
            SchemaKind::Vault => VAULT_SCHEMA,
            SchemaKind::VaultV2 => VAULT_V2_SCHEMA,
            SchemaKind::CustomWarning => CUSTOM_WARNING_SCHEMA,
            SchemaKind::Points => POINTS_SCHEMA,
            SchemaKind::ExchangeRateData => EXCHANGE_RATE_DATA_SCHEMA,
            SchemaKind::SpotPriceData => SPOT_PRICE_DATA_SCHEMA,
            SchemaKind::OraclePriceData => ORACLE_PRICE_DATA_SCHEMA,
        }
    }

    pub fn schema(self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self.source())
    }

    fn by_file_name(name: &str) -> Option<&'static str> {
        if name == "definitions.json" {
            return Some(DEFINITIONS_SCHEMA);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.file_name() == name)
            .map(SchemaKind::source)
    }
}

// Custom retriever for embedded schemas
pub struct SchemaRetriever;

impl Retrieve for SchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match uri.as_str() {
            // Handle fragment references by stripping the fragment part
            uri_str if uri_str.contains('#') => {
                let base_uri = uri_str.split('#').next().unwrap_or("");
                self.retrieve(
                    &Uri::from_str(base_uri).map_err(|e| format!("Failed to parse URI: {e}"))?,
                )
            }
            uri_str => {
                let name = uri_str
                    .strip_prefix(SCHEMA_BASE)
                    .or_else(|| uri_str.strip_prefix("./"))
                    .or_else(|| uri_str.strip_prefix("json-schema:///"))
                    .unwrap_or(uri_str);
                match SchemaKind::by_file_name(name) {
                    Some(source) => Ok(serde_json::from_str(source)?),
                    None => Err(format!("Unknown schema URI: {uri}").into()),
                }
            }
        }
    }
}

/// Compiled validators for every embedded schema
pub struct SchemaSet {
    validators: HashMap<SchemaKind, jsonschema::Validator>,
}

impl SchemaSet {
    pub fn compile() -> anyhow::Result<Self> {
        let mut validators = HashMap::new();
        for kind in SchemaKind::ALL {
            let schema = kind
                .schema()
                .map_err(|e| anyhow::anyhow!("Failed to parse {} schema: {e}", kind.file_name()))?;

            // Build validator with our custom retriever for offline validation
            let validator = jsonschema::draft7::options()
                .with_retriever(SchemaRetriever)
                .build(&schema)
                .map_err(|e| {
                    anyhow::anyhow!("Failed to compile {} schema: {e}", kind.file_name())
                })?;
            validators.insert(kind, validator);
        }
        Ok(Self { validators })
    }

    /// Every schema error for `instance`, as `<json pointer>: <message>`
    pub fn errors(&self, kind: SchemaKind, instance: &Value) -> Vec<String> {
        let Some(validator) = self.validators.get(&kind) else {
            return vec![format!("no compiled schema for {}", kind.file_name())];
        };
        validator
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect()
    }
}
