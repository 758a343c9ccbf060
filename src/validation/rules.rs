//! Building blocks shared by the per-registry validators

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde_json::Value;

use crate::address::verify_checksum;
use crate::chains::ChainScope;
use crate::loader::Record;

use super::report::CheckOutcome;

/// Human-readable position of a record: `index 4 (address: 0x...)`
pub fn locate(record: &Record, key_field: &str) -> String {
    match record.value.get(key_field) {
        Some(Value::String(s)) => format!("index {} ({key_field}: {s})", record.index),
        Some(Value::Number(n)) => format!("index {} ({key_field}: {n})", record.index),
        _ => format!("index {}", record.index),
    }
}

/// Case-insensitive `(chainId, address)` key
pub fn address_key(chain_id: u64, address: &str) -> (u64, String) {
    (chain_id, address.to_ascii_lowercase())
}

/// Remembers the first index each key was seen at, so every later collision
/// can be reported against it.
#[derive(Debug)]
pub struct DuplicateTracker<K> {
    seen: HashMap<K, usize>,
}

impl<K: Eq + Hash> Default for DuplicateTracker<K> {
    fn default() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> DuplicateTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the first occurrence when `key` was already seen
    pub fn observe(&mut self, key: K, index: usize) -> Option<usize> {
        match self.seen.get(&key) {
            Some(first) => Some(*first),
            None => {
                self.seen.insert(key, index);
                None
            }
        }
    }
}

/// Push a violation when `address` is not in canonical checksum form
pub fn check_address(outcome: &mut CheckOutcome, location: &str, field: &str, address: &str) {
    if let Err(message) = verify_checksum(address) {
        outcome.push(location, format!("{field}: {message}"));
    }
}

/// Push a violation when the chain id held in `field` is outside `scope`
pub fn check_chain(
    outcome: &mut CheckOutcome,
    scope: &ChainScope,
    location: &str,
    field: &str,
    record: &Value,
) {
    if let Some(chain_id) = record.get(field).and_then(Value::as_u64)
        && !scope.is_valid(chain_id)
    {
        outcome.push(
            location,
            format!("invalid {field} {chain_id}, expected one of: {}", scope.valid_list()),
        );
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// One price source taking part in an order sequence
pub struct OrderedEntry<'a> {
    pub index: usize,
    pub chain_id: u64,
    pub asset: &'a str,
    pub order: i64,
}

/// Price sources of the same `(assetChainId, asset)` must be ordered
/// `0, 1, ..., n-1` with no gaps or repeats.
pub fn check_order_sequences<'a>(
    outcome: &mut CheckOutcome,
    entries: impl IntoIterator<Item = OrderedEntry<'a>>,
) {
    let mut groups: BTreeMap<(u64, String), Vec<OrderedEntry<'a>>> = BTreeMap::new();
    for entry in entries {
        outcome.tick();
        groups
            .entry(address_key(entry.chain_id, entry.asset))
            .or_default()
            .push(entry);
    }

    for ((chain_id, _), mut group) in groups {
        group.sort_by_key(|entry| (entry.order, entry.index));
        let asset = group[0].asset;

        let mut orders = DuplicateTracker::new();
        for (position, entry) in group.iter().enumerate() {
            let location = format!("index {} (assetAddress: {asset})", entry.index);
            if let Some(first) = orders.observe(entry.order, entry.index) {
                outcome.push(
                    location,
                    format!(
                        "duplicate order {} for asset on chain {chain_id} \
                         (first used at index {first})",
                        entry.order
                    ),
                );
            } else if entry.order != position as i64 {
                outcome.push(
                    location,
                    format!(
                        "invalid order sequence on chain {chain_id}: \
                         expected order {position} but got {}",
                        entry.order
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::report::Category;
    use serde_json::json;

    fn entry(index: usize, asset: &str, order: i64) -> OrderedEntry<'_> {
        OrderedEntry {
            index,
            chain_id: 1,
            asset,
            order,
        }
    }

    #[test]
    fn test_locate_uses_key_field() {
        let record = Record {
            index: 3,
            value: json!({"address": "0xabc", "chainId": 1}),
        };
        assert_eq!(locate(&record, "address"), "index 3 (address: 0xabc)");
        assert_eq!(locate(&record, "chainId"), "index 3 (chainId: 1)");
        assert_eq!(locate(&record, "name"), "index 3");
    }

    #[test]
    fn test_duplicate_tracker_reports_first_index() {
        let mut tracker = DuplicateTracker::new();
        assert_eq!(tracker.observe(address_key(1, "0xAbC"), 0), None);
        assert_eq!(tracker.observe(address_key(8453, "0xabc"), 1), None);
        assert_eq!(tracker.observe(address_key(1, "0xabc"), 2), Some(0));
        assert_eq!(tracker.observe(address_key(1, "0xABC"), 5), Some(0));
    }

    #[test]
    fn test_contiguous_orders_pass() {
        let mut outcome = CheckOutcome::new("t", Category::Schema);
        check_order_sequences(
            &mut outcome,
            vec![entry(0, "0xA", 1), entry(1, "0xa", 0), entry(2, "0xB", 0)],
        );
        assert!(outcome.passed(), "{:?}", outcome.violations);
        assert_eq!(outcome.checked, 3);
    }

    #[test]
    fn test_gap_and_duplicate_orders_fail() {
        let mut outcome = CheckOutcome::new("t", Category::Schema);
        check_order_sequences(&mut outcome, vec![entry(0, "0xA", 0), entry(1, "0xA", 2)]);
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].message.contains("expected order 1 but got 2"));

        let mut outcome = CheckOutcome::new("t", Category::Schema);
        check_order_sequences(&mut outcome, vec![entry(4, "0xA", 0), entry(7, "0xA", 0)]);
        assert_eq!(outcome.violations.len(), 1);
        assert!(outcome.violations[0].message.contains("first used at index 4"));
    }

    #[test]
    fn test_check_chain_ignores_missing_field() {
        let scope = crate::chains::ORACLE_PRICES;
        let mut outcome = CheckOutcome::new("t", Category::Schema);
        check_chain(&mut outcome, &scope, "index 0", "assetChainId", &json!({}));
        check_chain(&mut outcome, &scope, "index 1", "assetChainId", &json!({"assetChainId": 10}));
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].location, "index 1");
    }
}
