use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An entry of `vaults-listing.json` or `vaults-v2-listing.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub address: String,
    pub chain_id: u64,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forum_link: Option<String>,

    /// Embedded curator cards of the v1 listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curators: Option<Vec<Value>>,
}
