#![forbid(unsafe_code)]

//! Keyed family of value containers.
//!
//! # Invariants
//!
//! 1. **One container per key**: once created, the nested container for a
//!    key is never replaced, so every hook and dispatcher for that key shares
//!    the same value and registry.
//!
//! 2. **Lazy creation only through `entry`**: a missing key is created by
//!    [`ValuesContainer::entry`] (the path used by `use_entry`) on a
//!    non-strict container. [`ValuesContainer::dispatch`] never creates keys.
//!
//! 3. **Strictness is fixed**: `strict` is set at construction and cannot be
//!    changed afterwards.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown key, strict | `entry`/`get`/`container` on a missing key | `LookupError::MissingKey` |
//! | Unknown key, dispatch | `dispatch` on a missing key (any mode) | `LookupError::MissingKey` |
//! | Unknown key, lenient | `entry` on a missing key | Key created with the initial value |

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use super::container::{Container, RegistryPolicy};
use crate::error::{LookupError, Result};

/// Construction options for a [`ValuesContainer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuesConfig {
    /// Refuse to create missing keys on access.
    pub strict: bool,
    /// Registry policy for every nested container.
    pub policy: RegistryPolicy,
}

impl ValuesConfig {
    /// Lenient config with the default registry policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict config with the default registry policy.
    #[must_use]
    pub fn strict() -> Self {
        Self::new().with_strict(true)
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RegistryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A shared map from keys to [`Container`]s.
///
/// Cloning a `ValuesContainer` creates a new handle to the same entries.
pub struct ValuesContainer<K, V> {
    entries: Rc<RefCell<HashMap<K, Container<V>>>>,
    config: ValuesConfig,
}

impl<K, V> Clone for ValuesContainer<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
            config: self.config,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ValuesContainer<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesContainer")
            .field("strict", &self.config.strict)
            .field("policy", &self.config.policy)
            .field("entries", &self.entries.borrow())
            .finish()
    }
}

impl<K, V> ValuesContainer<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + PartialEq + 'static,
{
    /// Create an empty container.
    #[must_use]
    pub fn new(config: ValuesConfig) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            config,
        }
    }

    /// Create a container from key/value pairs. Later duplicates of a key
    /// overwrite earlier ones.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, V)>, config: ValuesConfig) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (key, Container::with_policy(value, config.policy)))
            .collect();
        Self {
            entries: Rc::new(RefCell::new(entries)),
            config,
        }
    }

    /// Create a container from a map of initial values.
    #[must_use]
    pub fn from_map(map: HashMap<K, V>, config: ValuesConfig) -> Self {
        Self::from_pairs(map, config)
    }

    /// Nested container for `key`, created with `initial` if missing and the
    /// container is not strict.
    pub fn entry(&self, key: K, initial: impl FnOnce() -> V) -> Result<Container<V>> {
        if let Some(existing) = self.entries.borrow().get(&key) {
            return Ok(existing.clone());
        }
        if self.config.strict {
            tracing::debug!(message = "values.lookup.miss", key = ?key, strict = true);
            return Err(LookupError::missing(&key));
        }
        let created = Container::with_policy(initial(), self.config.policy);
        tracing::debug!(message = "values.entry.create", key = ?key);
        self.entries.borrow_mut().insert(key, created.clone());
        Ok(created)
    }

    /// Nested container for an existing key.
    pub fn container(&self, key: &K) -> Result<Container<V>> {
        self.entries
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| LookupError::missing(key))
    }

    /// Current value for an existing key.
    pub fn get(&self, key: &K) -> Result<V> {
        self.container(key).map(|c| c.get())
    }

    /// Forward `value` to the nested container for `key`.
    ///
    /// Fails for a missing key in every mode: only hook access creates keys.
    pub fn dispatch(&self, key: &K, value: V) -> Result<()> {
        let container = self.container(key)?;
        container.dispatch(value);
        Ok(())
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of the current keys, in unspecified order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.config.strict
    }

    #[must_use]
    pub fn config(&self) -> ValuesConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> ValuesContainer<&'static str, i32> {
        ValuesContainer::from_pairs([("a", 1), ("b", 2)], ValuesConfig::new())
    }

    #[test]
    fn from_pairs_creates_entries() {
        let c = ab();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&"a"), Ok(1));
        assert_eq!(c.get(&"b"), Ok(2));
    }

    #[test]
    fn from_map_creates_entries() {
        let map = HashMap::from([("key1".to_string(), 1), ("key2".to_string(), 2)]);
        let c = ValuesContainer::from_map(map, ValuesConfig::strict());
        assert!(c.is_strict());
        assert_eq!(c.get(&"key2".to_string()), Ok(2));
    }

    #[test]
    fn duplicate_pairs_last_wins() {
        let c = ValuesContainer::from_pairs([("a", 1), ("a", 5)], ValuesConfig::new());
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&"a"), Ok(5));
    }

    #[test]
    fn dispatch_updates_existing_key() {
        let c = ab();
        c.dispatch(&"a", 9).expect("key exists");
        assert_eq!(c.get(&"a"), Ok(9));
        assert_eq!(c.container(&"a").expect("key exists").version(), 1);
    }

    #[test]
    fn dispatch_missing_key_fails_in_lenient_mode() {
        let c = ab();
        let err = c.dispatch(&"missing", 3).unwrap_err();
        assert_eq!(err, LookupError::missing(&"missing"));
        assert!(!c.contains_key(&"missing"));
    }

    #[test]
    fn lenient_entry_creates_and_persists() {
        let c = ab();
        let created = c.entry("missing", || 0).expect("lenient");
        assert_eq!(created.get(), 0);
        assert!(c.contains_key(&"missing"));

        // The initial value only applies on creation.
        let again = c.entry("missing", || 100).expect("lenient");
        assert!(again.ptr_eq(&created));
        assert_eq!(again.get(), 0);
    }

    #[test]
    fn strict_entry_missing_key_fails() {
        let c = ValuesContainer::from_pairs([("a", 1)], ValuesConfig::strict());
        assert!(matches!(
            c.entry("missing", || 0),
            Err(LookupError::MissingKey { .. })
        ));
        assert!(!c.contains_key(&"missing"));
        assert_eq!(c.entry("a", || 0).map(|c| c.get()), Ok(1));
    }

    #[test]
    fn nested_containers_inherit_policy() {
        let config = ValuesConfig::new().with_policy(RegistryPolicy::Retain);
        let c = ValuesContainer::from_pairs([(1u8, "x")], config);
        assert_eq!(c.container(&1).expect("present").policy(), RegistryPolicy::Retain);
        assert_eq!(c.entry(2, || "y").expect("lenient").policy(), RegistryPolicy::Retain);
    }

    #[test]
    fn clones_share_entries() {
        let c = ValuesContainer::<String, i32>::new(ValuesConfig::new());
        let c2 = c.clone();
        c.entry("k".into(), || 1).expect("lenient");
        assert_eq!(c2.get(&"k".into()), Ok(1));
        assert_eq!(c2.len(), 1);
    }

    #[test]
    fn keys_snapshot() {
        let mut keys = ab().keys();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
