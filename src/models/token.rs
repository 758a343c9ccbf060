use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entry of `tokens.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub chain_id: u64,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,

    pub is_whitelisted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_listed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_oracles: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_hardcoded_oracles: Option<Value>,

    /// Anything else the curators attached; preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Token {
    pub fn logo_uri(&self) -> Option<&str> {
        self.metadata.as_ref()?.logo_uri.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        self.metadata
            .as_ref()
            .and_then(|m| m.tags.as_deref())
            .unwrap_or_default()
    }
}
