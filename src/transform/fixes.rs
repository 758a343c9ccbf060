use serde_json::Value;
use std::fmt;

use crate::address::{checksum, is_native_placeholder};
use crate::chains::PUBLISHED_TOKEN_CHAIN_IDS;
use crate::loader::Registry;
use crate::logo;

use super::{ChangeReport, TransformError, Transformed};

/// Corrective transforms the `fix` command can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Fix {
    /// Rewrite every address field in checksum form
    Checksum,
    /// Re-encode CDN logo URIs
    LogoUris,
    /// Keep only published-chain tokens that have a logo
    FilterTokens,
    /// Drop `forumLink` from vault listings
    RemoveForumLinks,
    /// Drop the vault `image`, keeping curator images
    RemoveImages,
    /// Drop vault `curators`, or only the curator given with `--curator`
    RemoveCurators,
}

impl Fix {
    /// Apply to `document`, the content of `registry`. `curator` narrows
    /// [`Fix::RemoveCurators`] to a single curator name.
    pub fn apply(
        self,
        registry: Registry,
        document: &Value,
        curator: Option<&str>,
    ) -> Result<Transformed, TransformError> {
        let vaults = matches!(registry, Registry::Vaults | Registry::VaultsV2);
        match (self, curator) {
            (Fix::RemoveCurators, Some(name)) if vaults => {
                remove_vault_curator(registry, document, name)
            }
            (fix, Some(_)) => Err(TransformError::CuratorFilter(fix)),
            (Fix::Checksum, None) => checksum_records(registry, document),
            (Fix::LogoUris, None) if registry == Registry::Tokens => encode_logo_uris(document),
            (Fix::FilterTokens, None) if registry == Registry::Tokens => filter_tokens(document),
            (Fix::RemoveForumLinks, None) if vaults => {
                remove_vault_field(registry, document, "forumLink")
            }
            (Fix::RemoveImages, None) if vaults => remove_vault_field(registry, document, "image"),
            (Fix::RemoveCurators, None) if vaults => {
                remove_vault_field(registry, document, "curators")
            }
            (fix, None) => Err(TransformError::Unsupported { fix, registry }),
        }
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fix::Checksum => "checksum",
            Fix::LogoUris => "logo-uris",
            Fix::FilterTokens => "filter-tokens",
            Fix::RemoveForumLinks => "remove-forum-links",
            Fix::RemoveImages => "remove-images",
            Fix::RemoveCurators => "remove-curators",
        };
        f.write_str(name)
    }
}

/// JSON pointers of the address fields each registry carries
pub fn address_fields(registry: Registry) -> &'static [&'static str] {
    match registry {
        Registry::Tokens | Registry::OracleVaults | Registry::Vaults | Registry::VaultsV2 => {
            &["/address"]
        }
        Registry::PriceFeeds => &["/address", "/tokenIn/address", "/tokenOut/address"],
        Registry::ExchangeRates | Registry::SpotPrices | Registry::OraclePrices => {
            &["/assetAddress", "/contractAddress"]
        }
        Registry::Curators | Registry::CustomWarnings | Registry::Points => &[],
    }
}

fn field_name(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}

fn records_of(registry: Registry, document: &Value) -> Result<Vec<Value>, TransformError> {
    document
        .as_array()
        .cloned()
        .ok_or(TransformError::NotAnArray(registry))
}

/// Normalise every address field to its checksum form. The native
/// placeholder is left as written; malformed addresses are kept and noted.
pub fn checksum_records(
    registry: Registry,
    document: &Value,
) -> Result<Transformed, TransformError> {
    let fields = address_fields(registry);
    if fields.is_empty() {
        return Err(TransformError::NoAddressFields(registry));
    }

    let mut records = records_of(registry, document)?;
    let mut report = ChangeReport::default();

    for (index, record) in records.iter_mut().enumerate() {
        for pointer in fields {
            let Some(Value::String(address)) = record.pointer_mut(pointer) else {
                continue;
            };
            if is_native_placeholder(address) {
                continue;
            }
            let location = format!("index {index} {}", field_name(pointer));
            match checksum(address) {
                Ok(canonical) if canonical.as_str() != address.as_str() => {
                    let canonical = canonical.into_string();
                    report.change(location, address.as_str(), canonical.as_str());
                    *address = canonical;
                }
                Ok(_) => {}
                Err(e) => report.note(format!("{location}: {e}, left as is")),
            }
        }
    }

    Ok(Transformed {
        document: Value::Array(records),
        report,
    })
}

fn describe_token(index: usize, token: &Value) -> String {
    let name = token.get("name").and_then(Value::as_str).unwrap_or("?");
    let address = token.get("address").and_then(Value::as_str).unwrap_or("?");
    match token.get("chainId").and_then(Value::as_u64) {
        Some(chain_id) => format!("index {index} ({name}, {address} on chain {chain_id})"),
        None => format!("index {index} ({name}, {address})"),
    }
}

fn logo_uri(token: &Value) -> Option<&str> {
    token
        .pointer("/metadata/logoURI")
        .and_then(Value::as_str)
        .filter(|uri| !uri.is_empty())
}

/// Rewrite CDN logo URIs to their canonical encoding; tokens without a logo
/// are noted.
pub fn encode_logo_uris(document: &Value) -> Result<Transformed, TransformError> {
    let mut records = records_of(Registry::Tokens, document)?;
    let mut report = ChangeReport::default();

    for (index, token) in records.iter_mut().enumerate() {
        let Some(uri) = logo_uri(token).map(str::to_string) else {
            report.note(format!("{} has no logoURI", describe_token(index, token)));
            continue;
        };
        match logo::canonical_logo_uri(&uri) {
            Ok(Some(expected)) if expected != uri => {
                report.change(
                    format!("{} metadata.logoURI", describe_token(index, token)),
                    uri,
                    expected.as_str(),
                );
                if let Some(slot) = token.pointer_mut("/metadata/logoURI") {
                    *slot = Value::String(expected);
                }
            }
            Ok(_) => {}
            Err(e) => report.note(format!("{}: {e}", describe_token(index, token))),
        }
    }

    Ok(Transformed {
        document: Value::Array(records),
        report,
    })
}

/// Keep tokens on a published chain that have a logo
pub fn filter_tokens(document: &Value) -> Result<Transformed, TransformError> {
    let records = records_of(Registry::Tokens, document)?;
    let total = records.len();
    let mut report = ChangeReport::default();
    let mut kept = Vec::with_capacity(total);

    for (index, token) in records.into_iter().enumerate() {
        let published = token
            .get("chainId")
            .and_then(Value::as_u64)
            .is_some_and(|id| PUBLISHED_TOKEN_CHAIN_IDS.contains(&id));
        let reason = match (published, logo_uri(&token).is_some()) {
            (true, true) => {
                kept.push(token);
                continue;
            }
            (false, _) => "chain is not published",
            (true, false) => "no logoURI",
        };
        report.change(describe_token(index, &token), reason, "removed");
    }

    report.note(format!("Filtered {total} tokens down to {}", kept.len()));
    Ok(Transformed {
        document: Value::Array(kept),
        report,
    })
}

fn describe_vault(index: usize, vault: &Value) -> String {
    let address = vault.get("address").and_then(Value::as_str).unwrap_or("?");
    format!("index {index} ({address})")
}

/// Remove `field` from every vault of a listing that carries it
pub fn remove_vault_field(
    registry: Registry,
    document: &Value,
    field: &str,
) -> Result<Transformed, TransformError> {
    let mut records = records_of(registry, document)?;
    let mut report = ChangeReport::default();

    for (index, vault) in records.iter_mut().enumerate() {
        let location = format!("{} {field}", describe_vault(index, vault));
        let Some(removed) = vault.as_object_mut().and_then(|vault| vault.remove(field)) else {
            continue;
        };
        let before = match removed {
            Value::String(text) => text,
            Value::Array(items) => format!("{} entries", items.len()),
            other => other.to_string(),
        };
        report.change(location, before, "removed");
    }

    if report.changes.is_empty() {
        report.note(format!("no {field} found in {registry}"));
    }
    Ok(Transformed {
        document: Value::Array(records),
        report,
    })
}

/// Remove the curator called `name` from every vault's `curators`
pub fn remove_vault_curator(
    registry: Registry,
    document: &Value,
    name: &str,
) -> Result<Transformed, TransformError> {
    let mut records = records_of(registry, document)?;
    let mut report = ChangeReport::default();

    for (index, vault) in records.iter_mut().enumerate() {
        let location = format!("{} curators", describe_vault(index, vault));
        let Some(curators) = vault.get_mut("curators").and_then(Value::as_array_mut) else {
            continue;
        };
        let before = curators.len();
        curators.retain(|curator| curator.get("name").and_then(Value::as_str) != Some(name));
        if curators.len() != before {
            report.change(location, name, "removed");
        }
    }

    if report.changes.is_empty() {
        report.note(format!("no vault in {registry} lists curator {name}"));
    }
    Ok(Transformed {
        document: Value::Array(records),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_price_feeds() {
        let document = json!([{
            "chainId": 1,
            "address": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "tokenIn": {"address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee", "chainId": 1},
            "tokenOut": {"address": "0x1234", "chainId": 1}
        }]);
        let Transformed { document, report } =
            checksum_records(Registry::PriceFeeds, &document).unwrap();

        assert_eq!(document[0]["address"], "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(document[0]["tokenIn"]["address"], "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");
        assert_eq!(document[0]["tokenOut"]["address"], "0x1234");
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].location, "index 0 address");
        assert_eq!(report.notes.len(), 1);
        assert!(report.notes[0].starts_with("index 0 tokenOut.address"));
    }

    #[test]
    fn test_checksum_is_idempotent() {
        let document = json!([{
            "assetAddress": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            "contractAddress": "0xdbF6ad4F4D5C24b1B4eA7e6E1cAd81b0bd6dd5BE"
        }]);
        let once = checksum_records(Registry::SpotPrices, &document).unwrap();
        let twice = checksum_records(Registry::SpotPrices, &once.document).unwrap();
        assert_eq!(once.document, twice.document);
        assert!(twice.report.changes.is_empty());
    }

    #[test]
    fn test_checksum_rejects_registries_without_addresses() {
        assert!(matches!(
            checksum_records(Registry::Points, &json!({})),
            Err(TransformError::NoAddressFields(Registry::Points))
        ));
        assert!(matches!(
            checksum_records(Registry::Tokens, &json!({})),
            Err(TransformError::NotAnArray(Registry::Tokens))
        ));
    }

    #[test]
    fn test_encode_logo_uris() {
        let logo = |file: &str| {
            json!({"logoURI": format!("https://cdn.morpho.org/assets/logos/{file}")})
        };
        let document = json!([
            {"name": "USDT0", "address": "0x1", "chainId": 1, "metadata": logo("usd₮0.svg")},
            {"name": "USDC", "address": "0x2", "chainId": 1, "metadata": logo("usdc.svg")},
            {"name": "Plain", "address": "0x3", "chainId": 1, "metadata": {}}
        ]);
        let Transformed { document, report } = encode_logo_uris(&document).unwrap();
        assert_eq!(
            document[0]["metadata"]["logoURI"],
            "https://cdn.morpho.org/assets/logos/usd%E2%82%AE0.svg"
        );
        assert_eq!(report.changes.len(), 1);
        let note = "index 2 (Plain, 0x3 on chain 1) has no logoURI";
        assert_eq!(report.notes, vec![note.to_string()]);
    }

    #[test]
    fn test_filter_tokens() {
        let logo = json!({"logoURI": "https://cdn.morpho.org/assets/logos/a.svg"});
        let document = json!([
            {"name": "A", "address": "0x1", "chainId": 1, "metadata": logo},
            {"name": "B", "address": "0x2", "chainId": 56, "metadata": logo},
            {"name": "C", "address": "0x3", "chainId": 988},
            {"name": "D", "address": "0x4", "chainId": 988, "metadata": logo}
        ]);
        let Transformed { document, report } = filter_tokens(&document).unwrap();
        let names: Vec<_> = document
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("A"), json!("D")]);
        assert_eq!(report.changes[0].before, "chain is not published");
        assert_eq!(report.changes[1].before, "no logoURI");
        assert_eq!(report.notes, vec!["Filtered 4 tokens down to 2".to_string()]);
    }

    #[test]
    fn test_fix_applicability() {
        assert!(matches!(
            Fix::LogoUris.apply(Registry::PriceFeeds, &json!([]), None),
            Err(TransformError::Unsupported { .. })
        ));
        assert!(matches!(
            Fix::RemoveImages.apply(Registry::Tokens, &json!([]), None),
            Err(TransformError::Unsupported { .. })
        ));
        assert!(matches!(
            Fix::Checksum.apply(Registry::Vaults, &json!([]), Some("Gauntlet")),
            Err(TransformError::CuratorFilter(Fix::Checksum))
        ));
        assert!(Fix::FilterTokens.apply(Registry::Tokens, &json!([]), None).is_ok());
        assert!(Fix::RemoveCurators.apply(Registry::VaultsV2, &json!([]), None).is_ok());
    }

    fn vaults() -> Value {
        let gauntlet = json!({"name": "Gauntlet", "image": "g.svg", "url": "", "verified": true});
        let re7 = json!({"name": "Re7", "image": "r.svg", "url": "", "verified": true});
        json!([
            {
                "address": "0x1",
                "chainId": 1,
                "image": "https://cdn.morpho.org/v2/assets/images/usdc.svg",
                "forumLink": "https://forum.morpho.org/t/1",
                "curators": [gauntlet, re7]
            },
            {"address": "0x2", "chainId": 8453, "curators": [re7]},
            {"address": "0x3", "chainId": 1}
        ])
    }

    #[test]
    fn test_remove_forum_links() {
        let Transformed { document, report } =
            Fix::RemoveForumLinks.apply(Registry::Vaults, &vaults(), None).unwrap();
        assert!(document[0].get("forumLink").is_none());
        assert_eq!(document[0]["image"], vaults()[0]["image"]);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].location, "index 0 (0x1) forumLink");
        assert_eq!(report.changes[0].before, "https://forum.morpho.org/t/1");

        let again = Fix::RemoveForumLinks.apply(Registry::Vaults, &document, None).unwrap();
        assert_eq!(again.document, document);
        assert_eq!(again.report.notes, vec!["no forumLink found in vaults-listing.json"]);
    }

    #[test]
    fn test_remove_vault_images_keeps_curator_images() {
        let Transformed { document, report } =
            Fix::RemoveImages.apply(Registry::Vaults, &vaults(), None).unwrap();
        assert!(document[0].get("image").is_none());
        assert_eq!(document[0]["curators"][0]["image"], "g.svg");
        assert_eq!(report.changes.len(), 1);
    }

    #[test]
    fn test_remove_all_curators() {
        let Transformed { document, report } =
            Fix::RemoveCurators.apply(Registry::VaultsV2, &vaults(), None).unwrap();
        assert!(document.as_array().unwrap().iter().all(|v| v.get("curators").is_none()));
        let befores: Vec<_> = report.changes.iter().map(|c| c.before.as_str()).collect();
        assert_eq!(befores, vec!["2 entries", "1 entries"]);
    }

    #[test]
    fn test_remove_one_curator_by_name() {
        let Transformed { document, report } =
            Fix::RemoveCurators.apply(Registry::Vaults, &vaults(), Some("Re7")).unwrap();
        assert_eq!(document[0]["curators"].as_array().unwrap().len(), 1);
        assert_eq!(document[0]["curators"][0]["name"], "Gauntlet");
        assert_eq!(document[1]["curators"], json!([]));
        assert_eq!(report.changes.len(), 2);

        let none = remove_vault_curator(Registry::Vaults, &document, "Re7").unwrap();
        assert!(none.report.changes.is_empty());
        assert_eq!(none.report.notes.len(), 1);
    }
}
