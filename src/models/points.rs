use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A reward / incentive badge shown next to an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_hover_card: Option<bool>,
}

/// chain id (decimal string) -> entity key -> points
pub type ChainPointsMap = BTreeMap<String, BTreeMap<String, Vec<Point>>>;

/// Layout of `points.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsMapping {
    #[serde(default)]
    pub vaults_with_points: ChainPointsMap,
    #[serde(default)]
    pub vaults_with_points_on_market: ChainPointsMap,
    #[serde(default)]
    pub vaults_with_points_on_market_collateral_token: ChainPointsMap,
    #[serde(default)]
    pub markets_with_points: ChainPointsMap,
    #[serde(default)]
    pub markets_with_points_on_collateral_token: ChainPointsMap,
}

/// The five mappings of `points.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointsMap {
    VaultsWithPoints,
    VaultsWithPointsOnMarket,
    VaultsWithPointsOnMarketCollateralToken,
    MarketsWithPoints,
    MarketsWithPointsOnCollateralToken,
}

/// What the keys of a mapping identify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Vault,
    Market,
    Token,
}

impl PointsMap {
    pub const ALL: [PointsMap; 5] = [
        PointsMap::VaultsWithPoints,
        PointsMap::VaultsWithPointsOnMarket,
        PointsMap::VaultsWithPointsOnMarketCollateralToken,
        PointsMap::MarketsWithPoints,
        PointsMap::MarketsWithPointsOnCollateralToken,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PointsMap::VaultsWithPoints => "vaultsWithPoints",
            PointsMap::VaultsWithPointsOnMarket => "vaultsWithPointsOnMarket",
            PointsMap::VaultsWithPointsOnMarketCollateralToken => {
                "vaultsWithPointsOnMarketCollateralToken"
            }
            PointsMap::MarketsWithPoints => "marketsWithPoints",
            PointsMap::MarketsWithPointsOnCollateralToken => "marketsWithPointsOnCollateralToken",
        }
    }

    pub fn key_kind(self) -> EntityKind {
        match self {
            PointsMap::VaultsWithPoints => EntityKind::Vault,
            PointsMap::VaultsWithPointsOnMarket | PointsMap::MarketsWithPoints => {
                EntityKind::Market
            }
            PointsMap::VaultsWithPointsOnMarketCollateralToken
            | PointsMap::MarketsWithPointsOnCollateralToken => EntityKind::Token,
        }
    }
}

impl fmt::Display for PointsMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One point, flattened out of its nested mapping
#[derive(Debug, Clone, Copy)]
pub struct PointEntry<'a> {
    pub map: PointsMap,
    pub chain_id: &'a str,
    pub key: &'a str,
    pub point_index: usize,
    pub point: &'a Point,
}

impl fmt::Display for PointEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → chain {} → {} [{}]",
            self.map, self.chain_id, self.key, self.point_index
        )
    }
}

impl PointsMapping {
    pub fn map(&self, which: PointsMap) -> &ChainPointsMap {
        match which {
            PointsMap::VaultsWithPoints => &self.vaults_with_points,
            PointsMap::VaultsWithPointsOnMarket => &self.vaults_with_points_on_market,
            PointsMap::VaultsWithPointsOnMarketCollateralToken => {
                &self.vaults_with_points_on_market_collateral_token
            }
            PointsMap::MarketsWithPoints => &self.markets_with_points,
            PointsMap::MarketsWithPointsOnCollateralToken => {
                &self.markets_with_points_on_collateral_token
            }
        }
    }

    /// `(map, chain id, entity key)` for every entity in every mapping
    pub fn keys(&self) -> impl Iterator<Item = (PointsMap, &str, &str)> {
        PointsMap::ALL.into_iter().flat_map(move |which| {
            self.map(which).iter().flat_map(move |(chain, entities)| {
                entities
                    .keys()
                    .map(move |key| (which, chain.as_str(), key.as_str()))
            })
        })
    }

    /// Every point of every mapping as a flat list
    pub fn entries(&self) -> Vec<PointEntry<'_>> {
        let mut entries = Vec::new();
        for which in PointsMap::ALL {
            for (chain_id, entities) in self.map(which) {
                for (key, points) in entities {
                    for (point_index, point) in points.iter().enumerate() {
                        entries.push(PointEntry {
                            map: which,
                            chain_id,
                            key,
                            point_index,
                            point,
                        });
                    }
                }
            }
        }
        entries
    }
}
