use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inline segment of a warning's `metadata.parts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WarningPart {
    Text {
        content: String,
    },
    Link {
        text: String,
        href: String,
        external: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningTarget<'a> {
    Vault(&'a str),
    Market(&'a str),
}

impl<'a> WarningTarget<'a> {
    /// What an entry of `custom-warnings.json` is attached to. Exactly one of
    /// `vaultAddress` / `marketId` must be a string.
    pub fn of_value(warning: &'a Value) -> Result<Self, &'static str> {
        let field = |name: &str| -> Option<&'a str> { warning.get(name).and_then(Value::as_str) };
        match (field("vaultAddress"), field("marketId")) {
            (Some(vault), None) => Ok(WarningTarget::Vault(vault)),
            (None, Some(market)) => Ok(WarningTarget::Market(market)),
            (Some(_), Some(_)) => Err("has both vaultAddress and marketId"),
            (None, None) => Err("has neither vaultAddress nor marketId"),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WarningTarget::Vault(_) => "vault",
            WarningTarget::Market(_) => "market",
        }
    }

    pub fn id(&self) -> &'a str {
        match *self {
            WarningTarget::Vault(id) | WarningTarget::Market(id) => id,
        }
    }
}
