#![forbid(unsafe_code)]

//! Shared value containers.
//!
//! This module provides the storage side of nanostate:
//!
//! - [`Container`]: a shared value with a registry of subscriber callbacks
//!   keyed by [`Handle`].
//! - [`ValuesContainer`]: a keyed family of containers, created eagerly from
//!   initial entries or lazily on first hook access.
//!
//! # Architecture
//!
//! `Container<V>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Every registry lives inside its own container; there is no process-wide
//! subscriber table.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Dispatching a value equal to the current value is a no-op (no version
//!    bump, no notifications, registry untouched).
//! 3. Each registered callback is invoked at most once per dispatch.
//! 4. No interior borrow is held while a callback runs, so callbacks may read
//!    or dispatch to the same container.

pub mod container;
pub mod handle;
pub mod values;

pub use container::{Container, Notify, RegistryPolicy};
pub use handle::Handle;
pub use values::{ValuesConfig, ValuesContainer};
