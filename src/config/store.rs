//! # Config Store
//!
//! A nested configuration tree with recursive merging and dot-path lookup.
//!
//! ## Merge Rules
//!
//! For every property `p` with value `v` in the source mapping:
//!
//! 1. `p` is absent in the destination: the value is inserted as-is.
//! 2. `v` is `null`: `p` is removed from the destination.
//! 3. both sides are mappings: the merge recurses.
//! 4. otherwise `v` overwrites the destination value.
//!
//! Sequences are never merged element-wise. A later sequence replaces an
//! earlier one wholesale (rule 4).

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// Holds a nested configuration mapping.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use soa_recipe::config::ConfigStore;
///
/// let mut store = ConfigStore::new();
/// store.set_configs([
///     json!({ "db": { "host": "localhost", "port": 5432 } }),
///     json!({ "db": { "host": "db.internal" } }),
/// ]);
///
/// assert_eq!(store.get("db.host"), Some(&json!("db.internal")));
/// assert_eq!(store.get("db.port"), Some(&json!(5432)));
/// assert_eq!(store.get("db.user"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    hash: Map<String, Value>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole tree with a single fragment, without merging.
    ///
    /// The fragment is taken over verbatim, `null` entries included. A
    /// fragment whose root is not a mapping leaves the store empty.
    pub fn set_config(&mut self, config: Value) -> &mut Self {
        self.hash = match config {
            Value::Object(map) => map,
            other => {
                warn!(kind = value_kind(&other), "Ignoring non-mapping config fragment");
                Map::new()
            }
        };
        self
    }

    /// Resets the tree and merges every fragment in order. Later fragments win.
    pub fn set_configs<I>(&mut self, configs: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.hash = Map::new();
        for config in configs {
            self.merge_config(config);
        }
        self
    }

    /// Deep-merges a fragment into the current tree.
    pub fn merge_config(&mut self, config: Value) -> &mut Self {
        match config {
            Value::Object(src) => merge_map(&mut self.hash, src),
            other => warn!(kind = value_kind(&other), "Ignoring non-mapping config fragment"),
        }
        self
    }

    /// Resolves a dot-separated path such as `"app.services"`.
    ///
    /// Returns `None` when a segment is missing or an intermediate value is
    /// not a mapping.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut scope = self.hash.get(first)?;

        for segment in segments {
            scope = scope.as_object()?.get(segment)?;
        }

        Some(scope)
    }

    /// Like [`ConfigStore::get`], with a fallback for unresolved paths.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Resolves a path and deserializes the value into `T`.
    ///
    /// A value of the wrong shape is treated like a missing one.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = self.get(path)?;
        T::deserialize(value).ok()
    }

    /// The live root mapping.
    pub fn hash(&self) -> &Map<String, Value> {
        &self.hash
    }

    /// Mutable access to the live root mapping.
    ///
    /// Writes through this reference bypass the merge rules.
    pub fn hash_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.hash
    }

    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }
}

/// Deep-merges `src` into `dest` following the store's merge rules.
///
/// When `dest` and `src` are not both mappings, `src` replaces `dest`.
pub fn merge_value(dest: &mut Value, src: Value) {
    match (dest, src) {
        (Value::Object(dest), Value::Object(src)) => merge_map(dest, src),
        (dest, src) => *dest = src,
    }
}

fn merge_map(dest: &mut Map<String, Value>, src: Map<String, Value>) {
    for (property, value) in src {
        if value.is_null() && dest.contains_key(&property) {
            // shift_remove keeps the remaining keys in declaration order
            dest.shift_remove(&property);
            continue;
        }

        match dest.get_mut(&property) {
            Some(existing) => merge_value(existing, value),
            None => {
                dest.insert(property, value);
            }
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_configs_merges_nested_mappings() {
        let mut store = ConfigStore::new();
        store.set_configs([
            json!({ "foo": 1, "bar": 1, "nested": { "foo": 1, "bar": 1 } }),
            json!({ "bar": "ok", "nested": { "foo": "ok" } }),
        ]);

        assert_eq!(store.get("foo"), Some(&json!(1)));
        assert_eq!(store.get("bar"), Some(&json!("ok")));
        assert_eq!(store.get("nested.bar"), Some(&json!(1)));
        assert_eq!(store.get("nested.foo"), Some(&json!("ok")));
    }

    #[test]
    fn test_sequences_are_replaced_not_merged() {
        let mut store = ConfigStore::new();
        store.set_configs([json!({ "a": [1, 2] }), json!({ "a": [2] })]);

        assert_eq!(store.get("a"), Some(&json!([2])));
    }

    #[test]
    fn test_sequence_replaces_mapping_and_vice_versa() {
        let mut store = ConfigStore::new();
        store.set_configs([
            json!({ "a": { "x": 1 }, "b": [1] }),
            json!({ "a": [1], "b": { "y": 2 } }),
        ]);

        assert_eq!(store.get("a"), Some(&json!([1])));
        assert_eq!(store.get("b"), Some(&json!({ "y": 2 })));
    }

    #[test]
    fn test_null_deletes_existing_keys() {
        let mut store = ConfigStore::new();
        store.set_configs([
            json!({ "a": "test", "b": {}, "c": { "d": 1, "e": 2 } }),
            json!({ "a": null, "b": null, "c": { "d": null } }),
        ]);

        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("c.d"), None);
        assert_eq!(store.get("c.e"), Some(&json!(2)));
    }

    #[test]
    fn test_null_for_absent_key_is_stored() {
        let mut store = ConfigStore::new();
        store.merge_config(json!({ "a": null }));

        assert_eq!(store.get("a"), Some(&Value::Null));
    }

    #[test]
    fn test_null_destination_is_overwritten_by_mapping() {
        let mut store = ConfigStore::new();
        store.set_config(json!({ "a": null }));
        store.merge_config(json!({ "a": { "b": 1 } }));

        assert_eq!(store.get("a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_set_config_single_fragment_is_taken_verbatim() {
        let mut store = ConfigStore::new();
        store.merge_config(json!({ "old": true }));
        store.set_config(json!({ "key1": null, "key2": false }));

        assert_eq!(store.get("old"), None);
        assert_eq!(store.get("key1"), Some(&Value::Null));
        assert_eq!(store.get("key2"), Some(&json!(false)));
    }

    #[test]
    fn test_set_configs_leaves_inputs_untouched() {
        let a = json!({ "x": { "y": 1 } });
        let b = json!({ "x": { "z": 2 } });

        let mut store = ConfigStore::new();
        store.set_configs([a.clone(), b.clone()]);
        store.hash_mut().insert("extra".into(), json!(true));

        assert_eq!(a, json!({ "x": { "y": 1 } }));
        assert_eq!(b, json!({ "x": { "z": 2 } }));
        assert_eq!(store.get("x"), Some(&json!({ "y": 1, "z": 2 })));
    }

    #[test]
    fn test_get_fails_softly_on_non_traversable_segments() {
        let mut store = ConfigStore::new();
        store.set_config(json!({
            "key1": null,
            "key2": false,
            "key4": "",
            "key5": 12,
            "list": [1, 2, 3]
        }));

        let default = json!(true);
        for path in ["key1.xyz", "key2.xyz", "key3.xyz", "key4.xyz", "key5.xyz", "list.0"] {
            assert_eq!(store.get_or(path, &default), &default, "path {path}");
        }
    }

    #[test]
    fn test_get_returns_default_for_missing_paths() {
        let store = ConfigStore::new();
        for default in [json!(true), json!(0), json!(""), json!([]), json!({})] {
            assert_eq!(store.get_or("not.existent.key", &default), &default);
            assert_eq!(store.get_or("not-existent-key", &default), &default);
        }
    }

    #[test]
    fn test_get_as_deserializes_values() {
        let mut store = ConfigStore::new();
        store.set_config(json!({ "service-manager": { "strictMode": true }, "port": "x" }));

        assert_eq!(store.get_as::<bool>("service-manager.strictMode"), Some(true));
        assert_eq!(store.get_as::<u16>("port"), None);
        assert_eq!(store.get_as::<u16>("missing"), None);
    }

    #[test]
    fn test_non_mapping_fragments_carry_no_keys() {
        let mut store = ConfigStore::new();
        store.set_config(json!({ "a": 1 }));
        store.merge_config(json!([1, 2]));
        assert_eq!(store.get("a"), Some(&json!(1)));

        store.set_config(json!("scalar"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_merge_value_on_plain_values() {
        let mut dest = json!({ "a": { "b": 1, "c": [1] } });
        merge_value(&mut dest, json!({ "a": { "c": [2, 3], "d": null } }));
        assert_eq!(dest, json!({ "a": { "b": 1, "c": [2, 3], "d": null } }));

        let mut scalar = json!(1);
        merge_value(&mut scalar, json!({ "x": 1 }));
        assert_eq!(scalar, json!({ "x": 1 }));
    }

    #[test]
    fn test_merge_keeps_declaration_order() {
        let mut store = ConfigStore::new();
        store.set_configs([json!({ "c": 1, "a": 2, "b": 3 }), json!({ "a": null, "d": 4 })]);

        let keys: Vec<_> = store.hash().keys().cloned().collect();
        assert_eq!(keys, ["c", "b", "d"]);
    }
}
