//! Application layer for kd-inspect.
//!
//! Knows *what* to check for every message and layout, and hands the
//! results to a [`ReportSink`] without knowing where they end up.

pub mod inspect_service;

pub use inspect_service::{layout_stats, InspectError, MessageInspector, ReportSink};
