#![forbid(unsafe_code)]

//! Commit-time registration of one render's callback.

use std::fmt;
use std::rc::Rc;

use super::host::Lifecycle;
use crate::reactive::{Container, Handle, Notify};

/// Where a [`ValueBinding`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPhase {
    /// Rendered, not committed yet. The registry has not been touched.
    Unregistered,
    /// Committed; the callback is stored under the binding's handle (until a
    /// dispatch clears the registry).
    Registered,
    /// Cleaned up or unmounted. Terminal.
    Deregistered,
}

/// Lifecycle of a single render of a `use_value*` hook.
///
/// Holds the value the render used and the callback to register. On commit
/// it reconciles first (a dispatch may have landed between render and
/// commit) and then registers; on cleanup or unmount it deregisters.
pub struct ValueBinding<V> {
    container: Container<V>,
    handle: Handle,
    rendered: V,
    notify: Notify<V>,
    phase: BindingPhase,
}

impl<V: fmt::Debug> fmt::Debug for ValueBinding<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBinding")
            .field("handle", &self.handle)
            .field("rendered", &self.rendered)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + PartialEq + 'static> ValueBinding<V> {
    #[must_use]
    pub fn new(container: Container<V>, handle: Handle, rendered: V, notify: Notify<V>) -> Self {
        Self {
            container,
            handle,
            rendered,
            notify,
            phase: BindingPhase::Unregistered,
        }
    }

    #[must_use]
    pub fn phase(&self) -> BindingPhase {
        self.phase
    }

    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Value the originating render displayed.
    #[must_use]
    pub fn rendered(&self) -> &V {
        &self.rendered
    }

    fn deregister(&mut self, reason: &'static str) {
        if self.phase == BindingPhase::Deregistered {
            return;
        }
        let removed = self.container.deregister(self.handle);
        self.phase = BindingPhase::Deregistered;
        tracing::debug!(
            message = "binding.deregister",
            handle = self.handle.get(),
            reason,
            removed
        );
    }
}

impl<V: Clone + PartialEq + 'static> Lifecycle for ValueBinding<V> {
    fn on_commit(&mut self) {
        if self.phase == BindingPhase::Deregistered {
            return;
        }
        let current = self.container.get();
        if current != self.rendered {
            tracing::debug!(
                message = "binding.reconcile",
                handle = self.handle.get(),
                version = self.container.version()
            );
            (self.notify)(&current);
        }
        self.container.register(self.handle, Rc::clone(&self.notify));
        self.phase = BindingPhase::Registered;
        tracing::debug!(message = "binding.register", handle = self.handle.get());
    }

    fn on_cleanup_before_next_commit(&mut self) {
        self.deregister("cleanup");
    }

    fn on_unmount(&mut self) {
        self.deregister("unmount");
    }
}
