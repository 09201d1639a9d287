#![forbid(unsafe_code)]

//! Capability contract a host UI framework implements.

/// Per-instance local state owned by the host.
///
/// Handles are cheap clones of the same slot. `set` stores the value and,
/// when it differs from the current one, asks the host scheduler to
/// re-render the owning instance. It must be callable at any time,
/// including from inside a container notification.
pub trait LocalState<T>: Clone + 'static {
    fn get(&self) -> T;
    fn set(&self, value: T);
}

/// Post-commit lifecycle of one render's effect.
///
/// For every lifecycle slot of an instance the host guarantees:
///
/// 1. `on_commit` runs only after the render that produced the lifecycle has
///    committed. Lifecycles of discarded renders are dropped without any
///    call.
/// 2. Before the next commit's `on_commit` runs, the previously committed
///    lifecycle receives `on_cleanup_before_next_commit`.
/// 3. When the instance unmounts, the last committed lifecycle receives
///    `on_unmount`, and nothing else afterwards.
pub trait Lifecycle {
    fn on_commit(&mut self);
    fn on_cleanup_before_next_commit(&mut self);
    fn on_unmount(&mut self);
}

/// Render-time access to the host's per-instance hook slots.
///
/// Slots are positional: a component must request them in the same order on
/// every render, as with any hook system.
pub trait Host {
    type State<T: Clone + PartialEq + 'static>: LocalState<T>;

    /// Local state slot, initialised with `init` on the instance's first
    /// render and persisted afterwards.
    fn use_state<T: Clone + PartialEq + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> Self::State<T>;

    /// Attach a lifecycle to the render in progress.
    fn use_lifecycle(&mut self, lifecycle: Box<dyn Lifecycle>);
}
