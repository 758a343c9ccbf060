//! Turns the legacy vendor feed lists, token lists and the nested vault
//! whitelist into canonical registry records.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::debug;

use crate::address::{NATIVE_PLACEHOLDER, checksum};
use crate::chains;
use crate::loader::{LoadError, RegistryLoader};
use crate::models::{PriceFeed, TokenRef, Vendor};

use super::ChangeReport;

pub const CHAINLINK_SOURCES: [(&str, u64); 2] = [
    ("chainlink-feeds-base.json", 8453),
    ("chainlink-feeds-mainnet.json", 1),
];
pub const REDSTONE_SOURCES: [(&str, u64); 2] = [
    ("redstone-feeds-base.json", 8453),
    ("redstone-feeds-mainnet.json", 1),
];
pub const MORPHO_LABS_FEEDS: &str = "morpho-labs-oracle-feeds-whitelist.json";
pub const MORPHO_LABS_TOKENS: &str = "morpho-labs-tokens-whitelist.json";
pub const DEFAULT_TOKEN_LIST: &str = "uniswap-labs-default-list.json";
pub const LEGACY_VAULT_WHITELIST: &str = "vaults-whitelist.json";

/// Output file names
pub const FEEDS_OUTPUT: &str = "all-feeds.json";
pub const TOKENS_OUTPUT: &str = "all-tokens.json";
pub const VAULTS_OUTPUT: &str = "vaults-whitelist.json";

/// Mainnet Chainlink documents do not carry decimals; their USD feeds use 8
const CHAINLINK_MAINNET_DECIMALS: i64 = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainlinkDocs {
    #[serde(default)]
    pub base_asset: Option<String>,
    #[serde(default)]
    pub quote_asset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainlinkFeed {
    pub name: String,
    #[serde(default)]
    pub pair: Vec<String>,
    #[serde(default)]
    pub docs: ChainlinkDocs,
    #[serde(default)]
    pub proxy_address: Option<String>,
    pub contract_address: String,
    pub threshold: Value,
    #[serde(default)]
    pub decimals: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedstoneFeed {
    pub symbol: String,
    pub denomination: String,
    pub contract_address: String,
    pub deviation_threshold: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorphoLabsFeed {
    pub chain_id: u64,
    pub contract_address: String,
    pub vendor: String,
    pub description: String,
    pub pair: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedList {
    oracle_feeds: Vec<MorphoLabsFeed>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenList {
    tokens: Vec<Map<String, Value>>,
}

/// chain id -> vault address -> listing metadata
pub type LegacyVaultWhitelist = BTreeMap<String, BTreeMap<String, Map<String, Value>>>;

/// Every legacy document the migration reads. Absent documents stay empty.
#[derive(Debug, Clone, Default)]
pub struct LegacySources {
    pub chainlink: Vec<(u64, Vec<ChainlinkFeed>)>,
    pub redstone: Vec<(u64, Vec<RedstoneFeed>)>,
    pub morpho_labs_feeds: Vec<MorphoLabsFeed>,
    pub morpho_labs_tokens: Vec<Map<String, Value>>,
    pub default_token_list: Vec<Map<String, Value>>,
    pub vault_whitelist: LegacyVaultWhitelist,
}

fn load_optional<T: DeserializeOwned>(
    loader: &RegistryLoader,
    file_name: &str,
    notes: &mut Vec<String>,
) -> Result<Option<T>, LoadError> {
    let value = match loader.load_document(file_name) {
        Ok(value) => value,
        Err(LoadError::NotFound { path }) => {
            notes.push(format!("{} not found, skipped", path.display()));
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(|_| LoadError::Shape {
            path: loader.data_dir().join(file_name),
            expected: "legacy document layout",
        })
}

impl LegacySources {
    /// Read the legacy documents of a directory. Missing files are skipped and
    /// reported in the returned notes; unreadable ones abort.
    pub fn load(loader: &RegistryLoader) -> Result<(Self, Vec<String>), LoadError> {
        let mut notes = Vec::new();
        let mut sources = LegacySources::default();

        for (file_name, chain_id) in CHAINLINK_SOURCES {
            if let Some(feeds) = load_optional(loader, file_name, &mut notes)? {
                sources.chainlink.push((chain_id, feeds));
            }
        }
        for (file_name, chain_id) in REDSTONE_SOURCES {
            if let Some(feeds) = load_optional(loader, file_name, &mut notes)? {
                sources.redstone.push((chain_id, feeds));
            }
        }
        if let Some(list) = load_optional::<FeedList>(loader, MORPHO_LABS_FEEDS, &mut notes)? {
            sources.morpho_labs_feeds = list.oracle_feeds;
        }
        if let Some(list) = load_optional::<TokenList>(loader, MORPHO_LABS_TOKENS, &mut notes)? {
            sources.morpho_labs_tokens = list.tokens;
        }
        if let Some(list) = load_optional::<TokenList>(loader, DEFAULT_TOKEN_LIST, &mut notes)? {
            sources.default_token_list = list.tokens;
        }
        if let Some(whitelist) = load_optional(loader, LEGACY_VAULT_WHITELIST, &mut notes)? {
            sources.vault_whitelist = whitelist;
        }

        Ok((sources, notes))
    }
}

/// Canonical documents produced by [`migrate`]
#[derive(Debug, Clone, Default)]
pub struct Migration {
    pub feeds: Vec<PriceFeed>,
    pub tokens: Vec<Value>,
    pub vaults: Vec<Value>,
    pub report: ChangeReport,
}

/// Maps pair symbols to token addresses on a chain
pub struct SymbolResolver<'a> {
    tokens: &'a [Value],
}

impl<'a> SymbolResolver<'a> {
    pub fn new(tokens: &'a [Value]) -> Self {
        Self { tokens }
    }

    /// ETH and WETH resolve to the wrapped native token, USD to the native
    /// placeholder, BTC to WBTC; anything else is looked up by symbol.
    pub fn resolve(&self, symbol: &str, chain_id: u64) -> Option<String> {
        let symbol = symbol.trim();
        let wanted = match symbol.to_ascii_uppercase().as_str() {
            "ETH" | "WETH" => {
                return chains::lookup(chain_id)
                    .and_then(|chain| chain.wrapped_native)
                    .map(str::to_string);
            }
            "USD" => return Some(NATIVE_PLACEHOLDER.to_string()),
            "BTC" => "WBTC",
            _ => symbol,
        };

        self.tokens
            .iter()
            .find(|token| {
                token.get("chainId").and_then(Value::as_u64) == Some(chain_id)
                    && token
                        .get("symbol")
                        .and_then(Value::as_str)
                        .is_some_and(|s| s.eq_ignore_ascii_case(wanted))
            })
            .and_then(|token| token.get("address").and_then(Value::as_str))
            .map(str::to_string)
    }

    fn token_ref(
        &self,
        symbol: &str,
        chain_id: u64,
        feed: &str,
        report: &mut ChangeReport,
    ) -> Option<TokenRef> {
        match self.resolve(symbol, chain_id) {
            Some(address) => Some(TokenRef { address, chain_id }),
            None => {
                report.note(format!("{feed}: no token for symbol {symbol} on chain {chain_id}"));
                None
            }
        }
    }
}

/// Numbers and strings the way the legacy documents print them
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn canonical_address(address: &str, context: &str, report: &mut ChangeReport) -> String {
    match checksum(address) {
        Ok(canonical) => canonical.into_string(),
        Err(e) => {
            report.note(format!("{context}: {e}, kept as is"));
            address.to_string()
        }
    }
}

/// Pair of a Chainlink feed: its own pair, the documented assets, or the
/// name split on `/`
fn chainlink_pair(feed: &ChainlinkFeed) -> Option<Vec<String>> {
    if feed.pair.len() == 2 && feed.pair.iter().all(|s| !s.is_empty()) {
        return Some(feed.pair.iter().map(|s| s.trim().to_string()).collect());
    }
    if let (Some(base), Some(quote)) = (&feed.docs.base_asset, &feed.docs.quote_asset)
        && !base.is_empty()
        && !quote.is_empty()
    {
        return Some(vec![base.trim().to_string(), quote.trim().to_string()]);
    }
    if feed.name.contains('/') {
        return Some(feed.name.split('/').map(|s| s.trim().to_string()).collect());
    }
    None
}

fn pair_refs(
    resolver: &SymbolResolver<'_>,
    pair: Option<&[String]>,
    chain_id: u64,
    feed: &str,
    report: &mut ChangeReport,
) -> (Option<TokenRef>, Option<TokenRef>) {
    let token_in = pair
        .and_then(|p| p.first())
        .and_then(|symbol| resolver.token_ref(symbol, chain_id, feed, report));
    let token_out = pair
        .and_then(|p| p.get(1))
        .and_then(|symbol| resolver.token_ref(symbol, chain_id, feed, report));
    (token_in, token_out)
}

fn migrate_chainlink(
    feed: &ChainlinkFeed,
    chain_id: u64,
    resolver: &SymbolResolver<'_>,
    report: &mut ChangeReport,
) -> PriceFeed {
    let context = format!("Chainlink feed {} on chain {chain_id}", feed.name);
    let pair = chainlink_pair(feed);
    if pair.is_none() {
        report.note(format!("{context}: no pair could be derived"));
    }
    let (token_in, token_out) = pair_refs(resolver, pair.as_deref(), chain_id, &context, report);
    let address = feed
        .proxy_address
        .as_deref()
        .filter(|a| !a.is_empty())
        .unwrap_or(&feed.contract_address);
    let decimals = if chain_id == 1 {
        Some(CHAINLINK_MAINNET_DECIMALS)
    } else {
        feed.decimals
    };

    PriceFeed {
        chain_id,
        address: canonical_address(address, &context, report),
        vendor: Vendor::Chainlink.as_str().to_string(),
        description: format!("{} ({}%)", feed.name, plain(&feed.threshold)),
        pair,
        token_in,
        token_out,
        decimals,
    }
}

fn migrate_redstone(
    feed: &RedstoneFeed,
    chain_id: u64,
    resolver: &SymbolResolver<'_>,
    report: &mut ChangeReport,
) -> PriceFeed {
    let context = format!(
        "Redstone feed {}/{} on chain {chain_id}",
        feed.symbol, feed.denomination
    );
    let pair = vec![feed.symbol.clone(), feed.denomination.clone()];
    let (token_in, token_out) =
        pair_refs(resolver, Some(pair.as_slice()), chain_id, &context, report);

    PriceFeed {
        chain_id,
        address: canonical_address(&feed.contract_address, &context, report),
        vendor: Vendor::Redstone.as_str().to_string(),
        description: format!(
            "{}/{} ({})",
            feed.symbol,
            feed.denomination,
            plain(&feed.deviation_threshold)
        ),
        pair: Some(pair),
        token_in,
        token_out,
        decimals: None,
    }
}

fn migrate_morpho_labs(
    feed: &MorphoLabsFeed,
    resolver: &SymbolResolver<'_>,
    report: &mut ChangeReport,
) -> PriceFeed {
    let context = format!(
        "{} feed {} on chain {}",
        feed.vendor, feed.description, feed.chain_id
    );
    let pair = Some(feed.pair.as_slice());
    let (token_in, token_out) = pair_refs(resolver, pair, feed.chain_id, &context, report);

    PriceFeed {
        chain_id: feed.chain_id,
        address: canonical_address(&feed.contract_address, &context, report),
        vendor: feed.vendor.clone(),
        description: feed.description.clone(),
        pair: Some(feed.pair.clone()),
        token_in,
        token_out,
        decimals: None,
    }
}

/// Both token lists, every entry whitelisted. The default list only
/// contributes its canonical fields.
fn migrate_tokens(sources: &LegacySources) -> Vec<Value> {
    const DEFAULT_LIST_FIELDS: [&str; 6] =
        ["chainId", "address", "symbol", "decimals", "name", "metadata"];

    let labs = sources.morpho_labs_tokens.iter().cloned();
    let default_list = sources.default_token_list.iter().map(|token| {
        DEFAULT_LIST_FIELDS
            .iter()
            .filter_map(|field| Some((field.to_string(), token.get(*field)?.clone())))
            .collect::<Map<String, Value>>()
    });

    labs.chain(default_list)
        .map(|mut token| {
            token.insert("isWhitelisted".to_string(), json!(true));
            Value::Object(token)
        })
        .collect()
}

fn migrate_vaults(whitelist: &LegacyVaultWhitelist, report: &mut ChangeReport) -> Vec<Value> {
    let mut vaults = Vec::new();
    for (chain, entries) in whitelist {
        let Ok(chain_id) = chain.parse::<u64>() else {
            report.note(format!("vault whitelist chain key {chain} is not a chain id, skipped"));
            continue;
        };
        for (address, metadata) in entries {
            let context = format!("vault {address} on chain {chain_id}");
            let mut vault = Map::new();
            vault.insert(
                "address".to_string(),
                json!(canonical_address(address, &context, report)),
            );
            vault.insert("chainId".to_string(), json!(chain_id));
            for (key, value) in metadata {
                vault.entry(key.clone()).or_insert_with(|| value.clone());
            }
            vaults.push(Value::Object(vault));
        }
    }
    vaults
}

/// Build the canonical feed, token and vault documents from the legacy
/// sources. Feeds are ordered Redstone, Chainlink, then the Morpho Labs list.
pub fn migrate(sources: &LegacySources) -> Migration {
    let mut report = ChangeReport::default();
    let tokens = migrate_tokens(sources);
    let resolver = SymbolResolver::new(&tokens);

    let mut feeds = Vec::new();
    for (chain_id, list) in &sources.redstone {
        feeds.extend(list.iter().map(|f| migrate_redstone(f, *chain_id, &resolver, &mut report)));
    }
    for (chain_id, list) in &sources.chainlink {
        feeds.extend(list.iter().map(|f| migrate_chainlink(f, *chain_id, &resolver, &mut report)));
    }
    feeds.extend(
        sources
            .morpho_labs_feeds
            .iter()
            .map(|f| migrate_morpho_labs(f, &resolver, &mut report)),
    );

    let vaults = migrate_vaults(&sources.vault_whitelist, &mut report);
    debug!(
        "Migrated {} feeds, {} tokens, {} vaults",
        feeds.len(),
        tokens.len(),
        vaults.len()
    );

    Migration {
        feeds,
        tokens,
        vaults,
        report,
    }
}
