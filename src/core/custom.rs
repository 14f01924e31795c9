//! Purpose: Open-ended attribute storage plus the per-record-type alias table.
//! Exports: `CustomAttributeBag`, alias registry functions (`map_alias`, `resolve_alias`, ...).
//! Role: Custom-field tier of custom-capable records (accounts, leads, opportunities).
//! Invariants: Alias mappings are process-wide, keyed by `RecordKind`, last write wins.
//! Invariants: Callers mutating aliases from several threads serialize those writes
//! themselves; the lock only keeps the table memory-safe, it does not order writers.
//! Invariants: Custom values are never null-filtered on the way out.
use super::record::RecordKind;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

type AliasTable = HashMap<RecordKind, HashMap<String, String>>;

static ALIASES: LazyLock<RwLock<AliasTable>> = LazyLock::new(|| RwLock::new(HashMap::new()));

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomAttributeBag {
    values: Map<String, Value>,
}

impl CustomAttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn clear(&mut self, key: &str) {
        self.values.shift_remove(key);
    }

    /// Clears the listed keys, or every key when `keys` is empty.
    pub fn clear_all(&mut self, keys: &[&str]) {
        if keys.is_empty() {
            self.values.clear();
            return;
        }
        for key in keys {
            self.clear(key);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.values.clone()
    }
}

/// Registers `alias` as a friendly name for the custom field `canonical` on `kind`.
pub fn map_alias(kind: RecordKind, alias: impl Into<String>, canonical: impl Into<String>) {
    let mut table = ALIASES.write().unwrap_or_else(|poison| poison.into_inner());
    table
        .entry(kind)
        .or_default()
        .insert(alias.into(), canonical.into());
}

pub fn unmap_alias(kind: RecordKind, alias: &str) {
    let mut table = ALIASES.write().unwrap_or_else(|poison| poison.into_inner());
    if let Some(aliases) = table.get_mut(&kind) {
        aliases.remove(alias);
    }
}

/// Removes the listed aliases, or every alias of `kind` when `aliases` is empty.
pub fn unmap_aliases(kind: RecordKind, aliases: &[&str]) {
    if aliases.is_empty() {
        let mut table = ALIASES.write().unwrap_or_else(|poison| poison.into_inner());
        table.remove(&kind);
        return;
    }
    for alias in aliases {
        unmap_alias(kind, alias);
    }
}

/// Returns the canonical key for `key` when it is a registered alias, else `key` itself.
pub fn resolve_alias(kind: RecordKind, key: &str) -> String {
    let table = ALIASES.read().unwrap_or_else(|poison| poison.into_inner());
    table
        .get(&kind)
        .and_then(|aliases| aliases.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

pub fn is_alias(kind: RecordKind, key: &str) -> bool {
    let table = ALIASES.read().unwrap_or_else(|poison| poison.into_inner());
    table
        .get(&kind)
        .is_some_and(|aliases| aliases.contains_key(key))
}

/// Snapshot of the aliases registered for `kind`, sorted by alias.
pub fn aliases_for(kind: RecordKind) -> Vec<(String, String)> {
    let table = ALIASES.read().unwrap_or_else(|poison| poison.into_inner());
    let mut entries: Vec<(String, String)> = table
        .get(&kind)
        .map(|aliases| {
            aliases
                .iter()
                .map(|(alias, canonical)| (alias.clone(), canonical.clone()))
                .collect()
        })
        .unwrap_or_default();
    entries.sort();
    entries
}

/// Drops every alias for every record type.
pub fn reset_aliases() {
    let mut table = ALIASES.write().unwrap_or_else(|poison| poison.into_inner());
    table.clear();
}

#[cfg(test)]
static REGISTRY_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Serializes unit tests that touch the process-wide alias table.
#[cfg(test)]
pub(crate) fn registry_test_lock() -> std::sync::MutexGuard<'static, ()> {
    REGISTRY_TEST_LOCK
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{
        CustomAttributeBag, aliases_for, is_alias, map_alias, registry_test_lock, reset_aliases,
        resolve_alias, unmap_alias, unmap_aliases,
    };
    use crate::core::record::RecordKind;
    use serde_json::json;

    #[test]
    fn clear_all_without_keys_empties_bag() {
        let mut bag = CustomAttributeBag::new();
        bag.set("color_5f1a", json!("teal"));
        bag.set("size_77b0", json!(3));
        bag.clear_all(&[]);
        assert!(bag.is_empty());
    }

    #[test]
    fn clear_all_with_keys_only_removes_listed() {
        let mut bag = CustomAttributeBag::new();
        bag.set("color_5f1a", json!("teal"));
        bag.set("size_77b0", json!(3));
        bag.clear_all(&["size_77b0", "not_there"]);
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("color_5f1a"), Some(&json!("teal")));
    }

    #[test]
    fn null_custom_values_are_kept_but_read_as_absent() {
        let mut bag = CustomAttributeBag::new();
        bag.set("notes_9c", json!(null));
        assert!(bag.contains("notes_9c"));
        assert_eq!(bag.get("notes_9c"), None);
        assert_eq!(bag.to_map().get("notes_9c"), Some(&json!(null)));
    }

    #[test]
    fn aliases_resolve_per_record_kind() {
        let _guard = registry_test_lock();
        reset_aliases();
        map_alias(RecordKind::Lead, "shoeSize", "shoe_size_5e2c1");
        assert_eq!(resolve_alias(RecordKind::Lead, "shoeSize"), "shoe_size_5e2c1");
        assert_eq!(resolve_alias(RecordKind::Account, "shoeSize"), "shoeSize");
        assert!(is_alias(RecordKind::Lead, "shoeSize"));
        reset_aliases();
    }

    #[test]
    fn remapping_alias_last_write_wins() {
        let _guard = registry_test_lock();
        reset_aliases();
        map_alias(RecordKind::Account, "tier", "tier_1");
        map_alias(RecordKind::Account, "tier", "tier_2");
        assert_eq!(resolve_alias(RecordKind::Account, "tier"), "tier_2");
        reset_aliases();
    }

    #[test]
    fn unmap_aliases_empty_clears_only_that_kind() {
        let _guard = registry_test_lock();
        reset_aliases();
        map_alias(RecordKind::Lead, "a", "a_1");
        map_alias(RecordKind::Lead, "b", "b_1");
        map_alias(RecordKind::Opportunity, "c", "c_1");

        unmap_alias(RecordKind::Lead, "a");
        assert_eq!(
            aliases_for(RecordKind::Lead),
            vec![("b".to_string(), "b_1".to_string())]
        );

        unmap_aliases(RecordKind::Lead, &[]);
        assert!(aliases_for(RecordKind::Lead).is_empty());
        assert_eq!(resolve_alias(RecordKind::Opportunity, "c"), "c_1");
        reset_aliases();
    }
}
