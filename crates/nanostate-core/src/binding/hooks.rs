#![forbid(unsafe_code)]

//! Hook-style accessors for components.
//!
//! Every hook returns the value to render and a [`Dispatcher`] for the
//! container. Hooks request host slots positionally, so the same hook must
//! be called with the same [`Propagation`] on every render of an instance.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use super::host::{Host, LocalState};
use super::lifecycle::ValueBinding;
use crate::error::Result;
use crate::reactive::container::Dispatcher;
use crate::reactive::{Container, Handle, Notify, ValuesContainer};

/// How a notification reaches the component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// The callback writes the new value into local state; renders show the
    /// locally cached value.
    #[default]
    Cached,
    /// The callback bumps a local generation counter; renders read the
    /// container directly.
    Live,
}

/// Subscribe the calling component to `container`, caching the value in
/// local state.
pub fn use_value<H, V>(host: &mut H, container: &Container<V>) -> (V, Dispatcher<V>)
where
    H: Host,
    V: Clone + PartialEq + 'static,
{
    use_value_with(host, container, Propagation::Cached)
}

/// Subscribe the calling component to `container`, reading the value live
/// on every render.
pub fn use_value_live<H, V>(host: &mut H, container: &Container<V>) -> (V, Dispatcher<V>)
where
    H: Host,
    V: Clone + PartialEq + 'static,
{
    use_value_with(host, container, Propagation::Live)
}

/// Shared implementation of [`use_value`] and [`use_value_live`].
///
/// Slot order: handle, then the propagation slot, then the lifecycle.
pub fn use_value_with<H, V>(
    host: &mut H,
    container: &Container<V>,
    propagation: Propagation,
) -> (V, Dispatcher<V>)
where
    H: Host,
    V: Clone + PartialEq + 'static,
{
    let handle = host.use_state(Handle::mint).get();
    let (rendered, notify) = match propagation {
        Propagation::Cached => {
            let state = host.use_state(|| container.get());
            let setter = state.clone();
            let notify: Notify<V> = Rc::new(move |value: &V| setter.set(value.clone()));
            (state.get(), notify)
        }
        Propagation::Live => {
            let generation = host.use_state(|| 0u64);
            let notify: Notify<V> =
                Rc::new(move |_: &V| generation.set(generation.get().wrapping_add(1)));
            (container.get(), notify)
        }
    };
    host.use_lifecycle(Box::new(ValueBinding::new(
        container.clone(),
        handle,
        rendered.clone(),
        notify,
    )));
    (rendered, container.dispatcher())
}

/// Subscribe to the entry for `key`, creating it with `initial` when the
/// container is lenient and the key is missing.
///
/// Fails with [`LookupError`](crate::LookupError) on a strict container
/// without `key`; no host slots are requested in that case.
pub fn use_entry<H, K, V>(
    host: &mut H,
    values: &ValuesContainer<K, V>,
    key: K,
    initial: V,
) -> Result<(V, Dispatcher<V>)>
where
    H: Host,
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + PartialEq + 'static,
{
    let container = values.entry(key, || initial)?;
    Ok(use_value(host, &container))
}

/// [`use_entry`] with `V::default()` as the initial value.
pub fn use_entry_default<H, K, V>(
    host: &mut H,
    values: &ValuesContainer<K, V>,
    key: K,
) -> Result<(V, Dispatcher<V>)>
where
    H: Host,
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + PartialEq + Default + 'static,
{
    use_entry(host, values, key, V::default())
}

/// [`use_entry`] with live reads.
pub fn use_entry_live<H, K, V>(
    host: &mut H,
    values: &ValuesContainer<K, V>,
    key: K,
    initial: V,
) -> Result<(V, Dispatcher<V>)>
where
    H: Host,
    K: Hash + Eq + Clone + fmt::Debug + 'static,
    V: Clone + PartialEq + 'static,
{
    let container = values.entry(key, || initial)?;
    Ok(use_value_live(host, &container))
}
