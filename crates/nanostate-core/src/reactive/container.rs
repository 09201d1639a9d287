#![forbid(unsafe_code)]

//! Shared value container with a handle-keyed subscriber registry.
//!
//! # Design
//!
//! [`Container<V>`] wraps a value of type `V` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). [`Container::dispatch`] is the only write
//! path: when the new value differs from the current one (by `PartialEq`),
//! it is stored and every registered callback is invoked synchronously with
//! it. Callbacks are keyed by [`Handle`] so one component hook owns at most
//! one entry, and re-registering the same handle replaces the old callback.
//!
//! # Registry policy
//!
//! Registration is tied to the host's commit phase, which can lag behind
//! rendering. Under [`RegistryPolicy::ClearOnDispatch`] (the default) every
//! value-changing dispatch empties the registry before notifying; components
//! re-register on their next commit. This forgets callbacks left behind by
//! paused or abandoned renders without tracking per-handle staleness.
//! [`RegistryPolicy::Retain`] keeps registrations across dispatches and
//! relies solely on cleanup/unmount to remove them.
//!
//! # Performance
//!
//! | Operation      | Complexity                 |
//! |----------------|----------------------------|
//! | `get()`        | O(1) + clone               |
//! | `dispatch()`   | O(S) where S = subscribers |
//! | `register()`   | O(1) amortized             |
//! | `deregister()` | O(1)                       |
//!
//! # Failure Modes
//!
//! - **Re-entrant dispatch**: a callback may dispatch to the same container.
//!   Under `Retain` the outer pass stops once a nested dispatch has run, so
//!   every subscriber ends on the latest value. Nothing guards against the
//!   resulting notification storm; callers own termination.
//! - **Panicking callback**: unwinds through `dispatch`. Remaining callbacks
//!   of that pass are skipped; the container stays usable because no borrow
//!   is held while callbacks run.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::handle::Handle;

/// Subscriber callback. Receives the newly dispatched value.
pub type Notify<V> = Rc<dyn Fn(&V)>;

/// What a value-changing dispatch does with the subscriber registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RegistryPolicy {
    /// Empty the registry before notifying; live components re-register on
    /// their next commit.
    #[default]
    ClearOnDispatch,
    /// Keep registrations until their owner cleans up or unmounts.
    Retain,
}

impl RegistryPolicy {
    /// Stable lowercase name, as accepted by [`RegistryPolicy::parse`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClearOnDispatch => "clear",
            Self::Retain => "retain",
        }
    }

    /// Parse a policy name (`clear` / `retain`, case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" | "clear-on-dispatch" => Some(Self::ClearOnDispatch),
            "retain" => Some(Self::Retain),
            _ => None,
        }
    }
}

struct ContainerInner<V> {
    value: V,
    version: u64,
    policy: RegistryPolicy,
    subscribers: HashMap<Handle, Notify<V>>,
}

/// A shared value with handle-keyed change notification.
///
/// Cloning a `Container` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing mutation.
/// 2. `dispatch(v)` where `v == current` is a no-op.
/// 3. A handle maps to at most one callback; registering it again replaces
///    the previous callback.
/// 4. A callback removed from the registry is never invoked by a later
///    dispatch.
pub struct Container<V> {
    inner: Rc<RefCell<ContainerInner<V>>>,
}

impl<V> Clone for Container<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Container<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Container")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("policy", &inner.policy)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<V: Clone + PartialEq + Default + 'static> Default for Container<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Clone + PartialEq + 'static> Container<V> {
    /// Create a container with the default registry policy.
    #[must_use]
    pub fn new(value: V) -> Self {
        Self::with_policy(value, RegistryPolicy::default())
    }

    /// Create a container with an explicit registry policy.
    #[must_use]
    pub fn with_policy(value: V, policy: RegistryPolicy) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContainerInner {
                value,
                version: 0,
                policy,
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> V {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify subscribers, unless it equals the current
    /// value.
    pub fn dispatch(&self, value: V) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                tracing::trace!(message = "container.dispatch.noop", version = inner.version);
                return;
            }
            inner.value = value;
            inner.version += 1;
            let callbacks = inner.take_callbacks();
            (callbacks, inner.value.clone(), inner.version)
        };
        self.notify(callbacks, &value, version);
    }

    /// Modify the value in place. Subscribers are notified only if the
    /// result differs from a pre-modification snapshot.
    ///
    /// `f` runs while the container is borrowed and must not touch it.
    pub fn update(&self, f: impl FnOnce(&mut V)) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value == old {
                tracing::trace!(message = "container.dispatch.noop", version = inner.version);
                return;
            }
            inner.version += 1;
            let callbacks = inner.take_callbacks();
            (callbacks, inner.value.clone(), inner.version)
        };
        self.notify(callbacks, &value, version);
    }

    /// Cloneable mutate handle for this container.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<V> {
        Dispatcher {
            container: self.clone(),
        }
    }

    /// Store `notify` under `handle`, replacing any previous callback.
    ///
    /// Intended for binding layers; components go through the `use_*` hooks,
    /// which register only after commit.
    pub fn register(&self, handle: Handle, notify: Notify<V>) {
        let replaced = self
            .inner
            .borrow_mut()
            .subscribers
            .insert(handle, notify)
            .is_some();
        tracing::trace!(message = "container.register", handle = handle.get(), replaced);
    }

    /// Remove the callback stored under `handle`. Returns whether one was
    /// present.
    pub fn deregister(&self, handle: Handle) -> bool {
        let removed = self
            .inner
            .borrow_mut()
            .subscribers
            .remove(&handle)
            .is_some();
        tracing::trace!(message = "container.deregister", handle = handle.get(), removed);
        removed
    }

    /// Forget every registered callback. Returns how many were dropped.
    pub fn clear_subscribers(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let cleared = inner.subscribers.len();
        inner.subscribers.clear();
        tracing::trace!(message = "container.registry.clear", cleared);
        cleared
    }

    /// Whether `handle` currently has a registered callback.
    #[must_use]
    pub fn is_registered(&self, handle: Handle) -> bool {
        self.inner.borrow().subscribers.contains_key(&handle)
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Registry policy chosen at creation.
    #[must_use]
    pub fn policy(&self) -> RegistryPolicy {
        self.inner.borrow().policy
    }

    /// Whether two handles point at the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self, callbacks: Pending<V>, value: &V, version: u64) {
        match callbacks {
            Pending::Drained(callbacks) => {
                tracing::debug!(
                    message = "container.dispatch",
                    version,
                    notified = callbacks.len(),
                    policy = "clear"
                );
                for cb in &callbacks {
                    cb(value);
                }
            }
            Pending::Retained(handles) => {
                tracing::debug!(
                    message = "container.dispatch",
                    version,
                    notified = handles.len(),
                    policy = "retain"
                );
                // Look each handle up again: an earlier callback may have
                // replaced or removed it.
                for handle in handles {
                    let cb = {
                        let inner = self.inner.borrow();
                        if inner.version != version {
                            // A nested dispatch already delivered the newer
                            // value to every handle still registered.
                            tracing::trace!(
                                message = "container.dispatch.superseded",
                                version,
                                current = inner.version
                            );
                            return;
                        }
                        inner.subscribers.get(&handle).cloned()
                    };
                    if let Some(cb) = cb {
                        cb(value);
                    }
                }
            }
        }
    }
}

enum Pending<V> {
    Drained(Vec<Notify<V>>),
    Retained(Vec<Handle>),
}

impl<V> ContainerInner<V> {
    fn take_callbacks(&mut self) -> Pending<V> {
        match self.policy {
            RegistryPolicy::ClearOnDispatch => {
                let drained: Vec<Notify<V>> =
                    self.subscribers.drain().map(|(_, cb)| cb).collect();
                tracing::trace!(message = "container.registry.clear", cleared = drained.len());
                Pending::Drained(drained)
            }
            RegistryPolicy::Retain => Pending::Retained(self.subscribers.keys().copied().collect()),
        }
    }
}

/// Mutate handle returned alongside the value by the `use_*` hooks.
///
/// Dispatching through it is identical to calling
/// [`Container::dispatch`] on the container it was taken from.
pub struct Dispatcher<V> {
    container: Container<V>,
}

impl<V> Clone for Dispatcher<V> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
        }
    }
}

impl<V> fmt::Debug for Dispatcher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<V: Clone + PartialEq + 'static> Dispatcher<V> {
    pub fn dispatch(&self, value: V) {
        self.container.dispatch(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut V)) {
        self.container.update(f);
    }

    /// The container this dispatcher writes to.
    #[must_use]
    pub fn container(&self) -> &Container<V> {
        &self.container
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
