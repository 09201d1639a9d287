#![forbid(unsafe_code)]

//! Opaque subscriber identities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Registry key for one subscribing hook of one component instance.
///
/// Handles are minted once, stored in the instance's local state, and reused
/// for every re-registration, so the registry holds at most one callback per
/// hook. Values are process-unique and never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Mint a fresh handle.
    #[must_use]
    pub fn mint() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric identity, for logs.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle#{}", self.0)
    }
}
