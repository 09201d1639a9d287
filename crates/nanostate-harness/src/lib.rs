#![forbid(unsafe_code)]

//! Deterministic simulated host for nanostate.
//!
//! The harness stands in for a UI framework's scheduler. It owns a flat
//! arena of component instances and gives each render a [`Scope`] that
//! implements [`nanostate_core::Host`]:
//!
//! - **State slots** persist across renders; `set` marks the owning instance
//!   dirty.
//! - **Lifecycle slots** follow the commit contract: previous lifecycles are
//!   cleaned up before the new ones commit, the last committed ones are
//!   unmounted, and discarded renders' lifecycles are simply dropped.
//! - **Renders are explicit**: [`Harness::begin_render`] produces a
//!   [`PendingRender`] that can be committed or discarded later, so tests can
//!   interleave dispatches between render and commit.
//!
//! Every step is appended to a trace that can be dumped as JSONL.

pub mod config;
pub mod error;
pub mod harness;
pub mod scope;
pub mod trace;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use harness::{Harness, InstanceId, PendingRender};
pub use scope::{HarnessState, Scope};
pub use trace::TraceEvent;
