use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An entry of `curators-listing.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curator {
    pub id: String,
    pub name: String,
    pub verified: bool,

    /// Chain id (as a decimal string) to curator-controlled addresses
    pub addresses: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub socials: CuratorSocials,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratorSocials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum: Option<String>,
}

impl Curator {
    /// Every `(chain key, address)` pair the curator lists
    pub fn chain_addresses(&self) -> impl Iterator<Item = (&str, &str)> {
        self.addresses.iter().flat_map(|(chain, addresses)| {
            addresses
                .iter()
                .map(move |address| (chain.as_str(), address.as_str()))
        })
    }
}
