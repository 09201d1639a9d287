#![forbid(unsafe_code)]

//! Core: shared value containers and their component subscription bindings.
//!
//! # Role in nanostate
//! `nanostate-core` owns the only write path for shared UI state. A
//! [`Container`] holds one value plus a registry of subscriber callbacks; the
//! [`binding`] layer connects a container to a component instance through the
//! capabilities a host UI framework provides: local state whose setter
//! schedules a re-render, and a post-commit lifecycle.
//!
//! # Primary responsibilities
//! - **Container**: single value, strict-equality no-op check, synchronous
//!   notification, optional registry reset on dispatch.
//! - **ValuesContainer**: keyed family of containers with optional strict
//!   key checking.
//! - **Binding**: commit-time registration, cleanup-then-register on every
//!   commit, and render/commit reconciliation.
//!
//! # How it fits in the system
//! Host adapters (the deterministic `nanostate-harness`, or a real UI
//! framework) implement [`binding::Host`]. Application code only touches the
//! containers and the `use_*` hooks.

pub mod binding;
pub mod error;
pub mod reactive;

pub use binding::{
    BindingPhase, Dispatcher, Host, Lifecycle, LocalState, Propagation, ValueBinding, use_entry,
    use_entry_default, use_entry_live, use_value, use_value_live,
};
pub use error::{LookupError, Result};
pub use reactive::{Container, Handle, RegistryPolicy, ValuesConfig, ValuesContainer};
