#![forbid(unsafe_code)]

//! Component subscription bindings.
//!
//! A binding connects one hook call in one component instance to a
//! [`Container`](crate::Container). It needs exactly three capabilities from
//! the host UI framework, expressed by the traits in [`host`]:
//!
//! - a per-instance local-state primitive ([`LocalState`]) whose `set`
//!   schedules a re-render (the scheduler stays on the host side),
//! - a post-commit lifecycle ([`Lifecycle`]) with cleanup before the next
//!   commit and on unmount,
//! - positional hook slots to obtain both ([`Host`]).
//!
//! # State machine
//!
//! ```text
//!  render ──► Unregistered ──on_commit──► Registered ──cleanup/unmount──► Deregistered
//! ```
//!
//! Each render produces a fresh [`ValueBinding`]. A discarded render's
//! binding is dropped in `Unregistered` and never touches the registry.
//!
//! # Propagation variants
//!
//! - [`Propagation::Cached`] ([`use_value`]): the value lives in local state
//!   and the callback writes it there.
//! - [`Propagation::Live`] ([`use_value_live`]): local state holds only a
//!   generation counter; the callback bumps it and the next render reads the
//!   container directly.
//!
//! Both variants compare the committed render's value with the container at
//! commit time and schedule another render if they differ.

pub mod hooks;
pub mod host;
pub mod lifecycle;

pub use crate::reactive::container::Dispatcher;
pub use hooks::{
    Propagation, use_entry, use_entry_default, use_entry_live, use_value, use_value_live,
    use_value_with,
};
pub use host::{Host, Lifecycle, LocalState};
pub use lifecycle::{BindingPhase, ValueBinding};
