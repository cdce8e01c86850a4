//! Report types produced by the inspector.
//!
//! Every input line yields one [`MessageReport`]; a run ends with one
//! [`Summary`].  Both serialise to flat JSON objects so the output can be
//! piped into `jq`.

use kd_core::ProductName;
use serde::Serialize;

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host → KD.
    Command,
    /// KD → host.
    Event,
    /// The generic failure event.
    Failure,
    /// Not an embedding message, or a kind nobody defines.
    Unknown,
}

/// Drill-to-URL bookkeeping for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DrillOutcome {
    Started { id: String },
    DuplicateStart { id: String },
    Matched { id: String, url: String },
    Orphaned { id: String, url: String },
}

/// Result of inspecting one input line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageReport {
    /// 1-based line number in the input.
    pub line: usize,
    pub direction: Direction,
    /// The `data.type` tag, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// The `product` tag, when it names a known product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductName>,
    /// Whether the whole envelope decodes for its kind.
    pub valid_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drill: Option<DrillOutcome>,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub commands: usize,
    pub events: usize,
    pub failures: usize,
    pub unknown: usize,
    pub invalid_bodies: usize,
    pub orphaned_resolutions: usize,
    /// Drills that started but never resolved, sorted.
    pub pending_drills: Vec<String>,
}

impl Summary {
    /// Adds one report to the totals.
    pub fn record(&mut self, report: &MessageReport) {
        match report.direction {
            Direction::Command => self.commands += 1,
            Direction::Event => self.events += 1,
            Direction::Failure => self.failures += 1,
            Direction::Unknown => self.unknown += 1,
        }
        if report.kind.is_some() && report.direction != Direction::Unknown && !report.valid_body {
            self.invalid_bodies += 1;
        }
        if matches!(report.drill, Some(DrillOutcome::Orphaned { .. })) {
            self.orphaned_resolutions += 1;
        }
    }

    /// Total number of messages seen.
    pub fn total(&self) -> usize {
        self.commands + self.events + self.failures + self.unknown
    }
}

/// Shape of a persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutStats {
    /// Rows of the top-level layout.
    pub rows: usize,
    /// Columns in the whole tree.
    pub columns: usize,
    /// Widgets in the whole tree.
    pub widgets: usize,
    pub depth: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
