//! Supported chains and the chain scopes each registry is validated against

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: u64,
    pub name: &'static str,
    /// Environment variable holding the chain's RPC endpoint
    pub rpc_env: &'static str,
    pub native_currency: &'static str,
    /// Wrapped native token, when the registries have one for the chain
    pub wrapped_native: Option<&'static str>,
}

const CHAINS: &[ChainInfo] = &[
    ChainInfo {
        id: 1,
        name: "mainnet",
        rpc_env: "RPC_URL_MAINNET",
        native_currency: "ETH",
        wrapped_native: Some("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
    },
    ChainInfo {
        id: 8453,
        name: "base",
        rpc_env: "RPC_URL_BASE",
        native_currency: "ETH",
        wrapped_native: Some("0x4200000000000000000000000000000000000006"),
    },
    ChainInfo {
        id: 10,
        name: "optimism",
        rpc_env: "RPC_URL_OP",
        native_currency: "ETH",
        wrapped_native: Some("0x4200000000000000000000000000000000000006"),
    },
    ChainInfo {
        id: 130,
        name: "unichain",
        rpc_env: "RPC_URL_UNICHAIN",
        native_currency: "ETH",
        wrapped_native: Some("0x4200000000000000000000000000000000000006"),
    },
    ChainInfo {
        id: 137,
        name: "polygon",
        rpc_env: "RPC_URL_POLYGON",
        native_currency: "POL",
        wrapped_native: Some("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
    },
    ChainInfo {
        id: 143,
        name: "monad",
        rpc_env: "RPC_URL_MONAD",
        native_currency: "MON",
        wrapped_native: None,
    },
    ChainInfo {
        id: 988,
        name: "stable",
        rpc_env: "RPC_URL_STABLE",
        native_currency: "USDT0",
        wrapped_native: None,
    },
    ChainInfo {
        id: 999,
        name: "hyperevm",
        rpc_env: "RPC_URL_HYPEREVM",
        native_currency: "HYPE",
        wrapped_native: None,
    },
    ChainInfo {
        id: 747474,
        name: "katana",
        rpc_env: "RPC_URL_KATANA",
        native_currency: "ETH",
        wrapped_native: None,
    },
    ChainInfo {
        id: 42161,
        name: "arbitrum",
        rpc_env: "RPC_URL_ARBITRUM",
        native_currency: "ETH",
        wrapped_native: Some("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
    },
    ChainInfo {
        id: 98866,
        name: "plume",
        rpc_env: "RPC_URL_PLUME",
        native_currency: "PLUME",
        wrapped_native: None,
    },
];

static CHAIN_TABLE: Lazy<BTreeMap<u64, &'static ChainInfo>> =
    Lazy::new(|| CHAINS.iter().map(|c| (c.id, c)).collect());

/// Chains every registry may reference
pub const VALID_CHAIN_IDS: &[u64] = &[1, 8453, 10, 130, 137, 999, 747474, 42161, 143];

/// Chains whose tokens are published by `fix filter-tokens`
pub const PUBLISHED_TOKEN_CHAIN_IDS: &[u64] =
    &[1, 8453, 10, 130, 137, 143, 988, 999, 747474, 42161];

const TOKEN_CHAINS: &[u64] = &[1, 8453];
const PRICE_FEED_CHAINS: &[u64] = &[1, 8453, 137, 130];
const ORACLE_VAULT_CHAINS: &[u64] = &[1, 8453, 10, 130, 137, 999, 747474, 42161];
const ORACLE_PRICE_CHAINS: &[u64] = &[1, 8453];

pub fn lookup(chain_id: u64) -> Option<&'static ChainInfo> {
    CHAIN_TABLE.get(&chain_id).copied()
}

/// Which records of a registry get validated, and which chain ids they may carry.
#[derive(Debug, Clone, Copy)]
pub struct ChainScope {
    /// Records are kept only when every `chain_fields` value is in this set
    pub load_filter: Option<&'static [u64]>,
    pub chain_fields: &'static [&'static str],
    /// Chain ids accepted by the "chain IDs are valid" checks
    pub valid: &'static [u64],
}

impl ChainScope {
    pub const fn unfiltered(chain_fields: &'static [&'static str]) -> Self {
        Self {
            load_filter: None,
            chain_fields,
            valid: VALID_CHAIN_IDS,
        }
    }

    pub fn is_valid(&self, chain_id: u64) -> bool {
        self.valid.contains(&chain_id)
    }

    /// Records whose chain fields are missing or non-numeric are kept so the
    /// schema checks can report them.
    pub fn admits(&self, record: &serde_json::Value) -> bool {
        let Some(filter) = self.load_filter else {
            return true;
        };
        self.chain_fields.iter().all(|field| match record.get(field) {
            Some(value) => value.as_u64().is_none_or(|id| filter.contains(&id)),
            None => true,
        })
    }

    pub fn valid_list(&self) -> String {
        self.valid
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub const TOKENS: ChainScope = ChainScope {
    load_filter: Some(TOKEN_CHAINS),
    chain_fields: &["chainId"],
    valid: VALID_CHAIN_IDS,
};

pub const PRICE_FEEDS: ChainScope = ChainScope {
    load_filter: Some(PRICE_FEED_CHAINS),
    chain_fields: &["chainId"],
    valid: PRICE_FEED_CHAINS,
};

pub const ORACLE_VAULTS: ChainScope = ChainScope {
    load_filter: Some(ORACLE_VAULT_CHAINS),
    chain_fields: &["chainId"],
    valid: ORACLE_VAULT_CHAINS,
};

pub const PRICE_SOURCES: ChainScope = ChainScope {
    load_filter: Some(ORACLE_VAULT_CHAINS),
    chain_fields: &["assetChainId", "contractChainId"],
    valid: VALID_CHAIN_IDS,
};

pub const ORACLE_PRICES: ChainScope = ChainScope {
    load_filter: Some(ORACLE_PRICE_CHAINS),
    chain_fields: &["assetChainId", "contractChainId"],
    valid: ORACLE_PRICE_CHAINS,
};
