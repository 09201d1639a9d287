#![forbid(unsafe_code)]

//! nanostate demo library.
//!
//! The binary is a thin wrapper: [`cli`] parses options and [`app`] replays
//! the demo apps on the simulated host, so tests can run the same scripts
//! and inspect the frames.

pub mod app;
pub mod cli;
