#![forbid(unsafe_code)]

//! Harness event trace.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"render","seq":0,"instance":"input#1","epoch":1}
//! {"event":"commit","seq":1,"instance":"input#1","epoch":1,"view":"<input value=\"hi\">","lifecycles":1}
//! {"event":"discard","seq":2,"instance":"input#1","epoch":2}
//! {"event":"unmount","seq":3,"instance":"input#1"}
//! {"event":"skip_stale","seq":4}
//! {"event":"flush","seq":5,"renders":2}
//! ```

use serde::Serialize;

/// One step taken by the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Render {
        seq: u64,
        instance: String,
        epoch: u64,
    },
    Commit {
        seq: u64,
        instance: String,
        epoch: u64,
        view: String,
        lifecycles: usize,
    },
    Discard {
        seq: u64,
        instance: String,
        epoch: u64,
    },
    Unmount {
        seq: u64,
        instance: String,
    },
    /// A dirty mark for an instance that no longer exists was dropped.
    SkipStale { seq: u64 },
    Flush { seq: u64, renders: usize },
}

impl TraceEvent {
    /// Short event name, matching the JSONL `event` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Render { .. } => "render",
            Self::Commit { .. } => "commit",
            Self::Discard { .. } => "discard",
            Self::Unmount { .. } => "unmount",
            Self::SkipStale { .. } => "skip_stale",
            Self::Flush { .. } => "flush",
        }
    }

    /// Instance label, for events tied to one instance.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        match self {
            Self::Render { instance, .. }
            | Self::Commit { instance, .. }
            | Self::Discard { instance, .. }
            | Self::Unmount { instance, .. } => Some(instance),
            Self::SkipStale { .. } | Self::Flush { .. } => None,
        }
    }
}

/// Encode events as JSON lines.
pub fn to_jsonl(events: &[TraceEvent]) -> serde_json::Result<String> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}
