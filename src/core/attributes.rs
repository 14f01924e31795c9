//! Purpose: Fixed-schema attribute storage for records.
//! Exports: `AttributeBag`.
//! Role: Declared-field tier of a record; the custom tier lives in `core::custom`.
//! Invariants: The key set is fixed at construction; only values change.
//! Invariants: Writes to undeclared keys are dropped silently.
//! Invariants: Keys iterate in declaration order.
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBag {
    values: Map<String, Value>,
}

impl AttributeBag {
    /// Builds a bag with every declared key present and null.
    pub fn declare(keys: &[&str]) -> Self {
        let mut values = Map::with_capacity(keys.len());
        for key in keys {
            values.insert((*key).to_string(), Value::Null);
        }
        Self { values }
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the value for a declared key; undeclared keys and nulls yield `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    /// Stores `value` when `key` is declared. Returns whether the write landed.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn set_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in entries {
            self.set(&key, value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Full declared map, nulls included.
    pub fn to_map(&self) -> Map<String, Value> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeBag;
    use serde_json::{Value, json};

    #[test]
    fn declared_keys_start_null() {
        let bag = AttributeBag::declare(&["id", "firstName"]);
        assert!(bag.is_declared("id"));
        assert_eq!(bag.get("id"), None);
        assert_eq!(bag.to_map().get("firstName"), Some(&Value::Null));
    }

    #[test]
    fn undeclared_writes_are_dropped() {
        let mut bag = AttributeBag::declare(&["id"]);
        let before = bag.clone();
        assert!(!bag.set("favoriteColor", json!("teal")));
        assert_eq!(bag, before);
        assert_eq!(bag.get("favoriteColor"), None);
        assert!(!bag.is_declared("favoriteColor"));
    }

    #[test]
    fn set_all_applies_declared_entries_only() {
        let mut bag = AttributeBag::declare(&["id", "amount"]);
        bag.set_all(vec![
            ("amount".to_string(), json!(100)),
            ("stray".to_string(), json!(true)),
            ("id".to_string(), json!(7)),
        ]);
        assert_eq!(bag.get("amount"), Some(&json!(100)));
        assert_eq!(bag.get("id"), Some(&json!(7)));
        assert_eq!(bag.keys().collect::<Vec<_>>(), vec!["id", "amount"]);
    }

    #[test]
    fn to_map_keeps_declaration_order() {
        let mut bag = AttributeBag::declare(&["c", "a", "b"]);
        bag.set("b", json!(1));
        let keys: Vec<String> = bag.to_map().keys().cloned().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }
}
