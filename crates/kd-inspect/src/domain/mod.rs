//! Domain layer for kd-inspect.
//!
//! Pure types with no I/O: the resolved configuration and the reports the
//! inspector produces.

pub mod config;
pub mod report;

pub use config::InspectConfig;
pub use report::{Direction, DrillOutcome, LayoutStats, MessageReport, Summary};
