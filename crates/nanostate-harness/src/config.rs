#![forbid(unsafe_code)]

//! Harness configuration.

/// Default upper bound on renders performed by a single [`flush`].
///
/// [`flush`]: crate::Harness::flush
pub const DEFAULT_MAX_FLUSH_RENDERS: usize = 10_000;

/// Configuration for a [`Harness`](crate::Harness).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// A flush that needs more renders than this fails with
    /// [`HarnessError::RenderLoop`](crate::HarnessError::RenderLoop).
    pub max_flush_renders: usize,
    /// Record [`TraceEvent`](crate::TraceEvent)s.
    pub record_trace: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_flush_renders: DEFAULT_MAX_FLUSH_RENDERS,
            record_trace: true,
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flush render bound (clamped to at least 1).
    #[must_use]
    pub fn with_max_flush_renders(mut self, limit: usize) -> Self {
        self.max_flush_renders = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }
}
