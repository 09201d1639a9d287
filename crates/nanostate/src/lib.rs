#![forbid(unsafe_code)]

//! nanostate public facade crate.
//!
//! Shared state for component trees without a context provider: create a
//! container once, then subscribe components to it with the `use_*` hooks.
//!
//! ```
//! use nanostate::prelude::*;
//!
//! let greeting = create_container("hello".to_string());
//! let mut harness = Harness::default();
//! let c = greeting.clone();
//! let id = harness
//!     .mount("greeting", move |scope| use_value(scope, &c).0)
//!     .unwrap();
//!
//! greeting.dispatch("world".to_string());
//! harness.flush().unwrap();
//! assert_eq!(harness.view(id), Some("world"));
//! ```

pub use nanostate_core::{
    BindingPhase, Container, Dispatcher, Handle, Host, Lifecycle, LocalState, LookupError,
    Propagation, RegistryPolicy, ValueBinding, ValuesConfig, ValuesContainer, use_entry,
    use_entry_default, use_entry_live, use_value, use_value_live,
};

#[cfg(feature = "harness")]
pub use nanostate_harness as harness;

use std::fmt;
use std::hash::Hash;

/// Create a container holding `value`, with the default registry policy.
#[must_use]
pub fn create_container<V>(value: V) -> Container<V>
where
    V: Clone + PartialEq + 'static,
{
    Container::new(value)
}

/// Create a keyed container from initial entries.
///
/// `entries` may be any sequence of pairs, including a map. With `strict`
/// set, hooks and accessors fail on keys that were not given here.
#[must_use]
pub fn create_values_container<K, V>(
    entries: impl IntoIterator<Item = (K, V)>,
    strict: bool,
) -> ValuesContainer<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + PartialEq + 'static,
{
    let values =
        ValuesContainer::from_pairs(entries, ValuesConfig::new().with_strict(strict));
    tracing::debug!(
        message = "values.create",
        entries = values.len(),
        strict
    );
    values
}

pub mod prelude {
    pub use crate::{
        Container, Dispatcher, LookupError, Propagation, RegistryPolicy, ValuesConfig,
        ValuesContainer, create_container, create_values_container, use_entry, use_entry_default,
        use_entry_live, use_value, use_value_live,
    };

    #[cfg(feature = "harness")]
    pub use nanostate_harness::{Harness, HarnessConfig, InstanceId, Scope};
}
