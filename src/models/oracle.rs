use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain-scoped token reference used by price feeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    pub address: String,
    pub chain_id: u64,
}

/// An entry of `price-feeds.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFeed {
    pub chain_id: u64,
    pub address: String,
    pub vendor: String,
    pub description: String,

    #[serde(default)]
    pub pair: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_in: Option<TokenRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_out: Option<TokenRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<i64>,
}

/// An entry of `oracle-vaults.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleVault {
    pub address: String,
    pub chain_id: u64,
    pub vendor: String,
    pub pair: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_decimals: Option<i64>,
}

/// Shared layout of `exchange-rates.json`, `spot-prices.json` and
/// `oracle-prices.json`: one contract pricing one asset, with a
/// string-encoded payload whose shape depends on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSource {
    pub asset_address: String,
    pub contract_address: String,
    pub asset_chain_id: u64,
    pub contract_chain_id: u64,
    pub data: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

/// Oracle providers a price record may originate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Chainlink,
    Redstone,
    Chronicle,
    Api3,
    Pyth,
    Pendle,
    Oval,
    Hashnote,
    Midas,
    Spectra,
    Morpho,
}

impl Vendor {
    pub const ALL: [Vendor; 11] = [
        Vendor::Chainlink,
        Vendor::Redstone,
        Vendor::Chronicle,
        Vendor::Api3,
        Vendor::Pyth,
        Vendor::Pendle,
        Vendor::Oval,
        Vendor::Hashnote,
        Vendor::Midas,
        Vendor::Spectra,
        Vendor::Morpho,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Chainlink => "Chainlink",
            Vendor::Redstone => "Redstone",
            Vendor::Chronicle => "Chronicle",
            Vendor::Api3 => "API3",
            Vendor::Pyth => "Pyth",
            Vendor::Pendle => "Pendle",
            Vendor::Oval => "Oval",
            Vendor::Hashnote => "Hashnote",
            Vendor::Midas => "Midas",
            Vendor::Spectra => "Spectra",
            Vendor::Morpho => "Morpho",
        }
    }

    pub fn known_list() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = String;

    /// Case-insensitive; the registries mix "Redstone" and "RedStone".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown vendor '{s}'. Expected one of: {}", Self::known_list()))
    }
}

/// Mechanisms accepted in `spot-prices.json`
pub const SPOT_PRICE_TYPES: &[&str] = &[
    "uniswap_v3_twap",
    "aerodrome",
    "aerodrome_slip_stream",
    "ethena_staked_usde_exchange_rate",
    "erc4626_exchange_rate",
    "curve_pool",
];

/// Mechanisms accepted in `oracle-prices.json`
pub const ORACLE_PRICE_TYPES: &[&str] = &[
    "chainlink_aggregator",
    "chainlink_without_logs",
    "exchange_rate",
    "tri_crypto",
    "chronicle",
    "api3",
    "pyth_network",
    "redstone_without_logs",
    "hardcoded",
    "pendle_asset_rate",
    "hash_note",
];
