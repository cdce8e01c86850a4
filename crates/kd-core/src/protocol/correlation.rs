//! Pairing of `drillToUrlStarted` and `drillToUrlResolved` events.
//!
//! # How the two-phase notification works (for beginners)
//!
//! Resolving a drill URL takes KD some time.  Instead of blocking, KD posts
//! two one-shot events that share an opaque `id`:
//!
//! 1. `drillToUrlStarted {id}`: the host may show a loading indicator.
//! 2. `drillToUrlResolved {id, url}`: the host may open the URL.
//!
//! Any number of unrelated events may arrive in between, and several drills
//! may be in flight at once.  The host cannot cancel a drill through the
//! protocol; it can only stop caring about it ([`DrillToUrlCorrelator::forget`]).
//!
//! A resolved event whose id was never started is well-formed but
//! *orphaned*.  The correlator reports it as [`Resolution::Orphaned`] and
//! carries on.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::events::KdEvent;

/// Errors reported by [`DrillToUrlCorrelator`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorrelationError {
    /// A started event reused the id of a drill that is still pending.
    #[error("drill to URL {0} was already started and is still pending")]
    DuplicateStart(String),
}

/// Outcome of observing a `drillToUrlResolved` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The id matched an earlier started event.
    Matched { id: String, url: String },
    /// No started event with this id was seen (or it was forgotten).
    Orphaned { id: String, url: String },
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::Matched { id, .. } | Resolution::Orphaned { id, .. } => id,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Resolution::Matched { url, .. } | Resolution::Orphaned { url, .. } => url,
        }
    }

    pub fn is_orphaned(&self) -> bool {
        matches!(self, Resolution::Orphaned { .. })
    }
}

/// Tracks drills that have started but not yet resolved.
///
/// # Example
///
/// ```rust
/// use kd_core::{DrillToUrlCorrelator, Resolution};
///
/// let mut correlator = DrillToUrlCorrelator::new();
/// correlator.started("x").unwrap();
/// let resolution = correlator.resolved("x", "https://example.com");
/// assert!(matches!(resolution, Resolution::Matched { .. }));
/// assert_eq!(correlator.pending_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct DrillToUrlCorrelator {
    pending: HashSet<String>,
}

impl DrillToUrlCorrelator {
    /// Creates a correlator with no pending drills.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a started drill.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::DuplicateStart`] if `id` is already
    /// pending.  The original pending entry is kept.
    pub fn started(&mut self, id: impl Into<String>) -> Result<(), CorrelationError> {
        let id = id.into();
        if self.pending.contains(&id) {
            warn!(%id, "drill to URL started twice with the same id");
            return Err(CorrelationError::DuplicateStart(id));
        }
        debug!(%id, "drill to URL started");
        self.pending.insert(id);
        Ok(())
    }

    /// Records a resolved drill and pairs it with its started event.
    pub fn resolved(&mut self, id: &str, url: &str) -> Resolution {
        if self.pending.remove(id) {
            debug!(id, url, "drill to URL resolved");
            Resolution::Matched {
                id: id.to_string(),
                url: url.to_string(),
            }
        } else {
            warn!(id, url, "drill to URL resolved without a matching start");
            Resolution::Orphaned {
                id: id.to_string(),
                url: url.to_string(),
            }
        }
    }

    /// Feeds any event to the correlator.
    ///
    /// Returns `Ok(Some(_))` for resolved events, `Ok(None)` for started and
    /// unrelated events.
    ///
    /// # Errors
    ///
    /// See [`DrillToUrlCorrelator::started`].
    pub fn observe(&mut self, event: &KdEvent) -> Result<Option<Resolution>, CorrelationError> {
        match event {
            KdEvent::DrillToUrlStarted(body) => self.started(body.id.as_str()).map(|()| None),
            KdEvent::DrillToUrlResolved(body) => Ok(Some(self.resolved(&body.id, &body.url))),
            _ => Ok(None),
        }
    }

    /// Stops waiting for a drill.  A later resolved event for `id` will be
    /// reported as orphaned.  Returns `true` if the drill was pending.
    pub fn forget(&mut self, id: &str) -> bool {
        self.pending.remove(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns the pending ids in sorted order.
    pub fn pending_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.pending.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events::{
        DrillToUrlResolvedBody, DrillToUrlStartedBody, ResizedBody,
    };

    #[test]
    fn test_started_then_resolved_matches() {
        // Arrange
        let mut correlator = DrillToUrlCorrelator::new();

        // Act
        correlator.started("x").unwrap();
        let resolution = correlator.resolved("x", "https://example.com/a");

        // Assert
        assert_eq!(
            resolution,
            Resolution::Matched {
                id: "x".to_string(),
                url: "https://example.com/a".to_string()
            }
        );
        assert!(!correlator.is_pending("x"));
    }

    #[test]
    fn test_resolved_without_start_is_orphaned() {
        let mut correlator = DrillToUrlCorrelator::new();
        let resolution = correlator.resolved("ghost", "https://example.com");
        assert!(resolution.is_orphaned());
        assert_eq!(resolution.id(), "ghost");
        assert_eq!(resolution.url(), "https://example.com");
    }

    #[test]
    fn test_second_resolution_of_same_id_is_orphaned() {
        let mut correlator = DrillToUrlCorrelator::new();
        correlator.started("x").unwrap();
        assert!(!correlator.resolved("x", "u").is_orphaned());
        assert!(correlator.resolved("x", "u").is_orphaned());
    }

    #[test]
    fn test_duplicate_start_is_rejected_and_original_kept() {
        let mut correlator = DrillToUrlCorrelator::new();
        correlator.started("x").unwrap();

        let err = correlator.started("x").unwrap_err();

        assert_eq!(err, CorrelationError::DuplicateStart("x".to_string()));
        assert_eq!(correlator.pending_count(), 1);
    }

    #[test]
    fn test_interleaved_drills_resolve_out_of_order() {
        // Arrange: three drills in flight
        let mut correlator = DrillToUrlCorrelator::new();
        for id in ["a", "b", "c"] {
            correlator.started(id).unwrap();
        }

        // Act: resolve in a different order than started
        let b = correlator.resolved("b", "u-b");
        let a = correlator.resolved("a", "u-a");

        // Assert
        assert!(!a.is_orphaned());
        assert!(!b.is_orphaned());
        assert_eq!(correlator.pending_ids(), vec!["c"]);
    }

    #[test]
    fn test_forgotten_drill_resolves_as_orphan() {
        let mut correlator = DrillToUrlCorrelator::new();
        correlator.started("x").unwrap();
        assert!(correlator.forget("x"));
        assert!(!correlator.forget("x"));
        assert!(correlator.resolved("x", "u").is_orphaned());
    }

    #[test]
    fn test_observe_ignores_unrelated_events() {
        // Arrange
        let mut correlator = DrillToUrlCorrelator::new();
        let started = KdEvent::DrillToUrlStarted(DrillToUrlStartedBody { id: "1".to_string() });
        let noise = KdEvent::Resized(ResizedBody { height: 200.0 });
        let resolved = KdEvent::DrillToUrlResolved(DrillToUrlResolvedBody {
            id: "1".to_string(),
            url: "https://example.com".to_string(),
        });

        // Act
        let r1 = correlator.observe(&started).unwrap();
        let r2 = correlator.observe(&noise).unwrap();
        let r3 = correlator.observe(&resolved).unwrap();

        // Assert
        assert_eq!(r1, None);
        assert_eq!(r2, None);
        assert!(matches!(r3, Some(Resolution::Matched { .. })));
    }
}
