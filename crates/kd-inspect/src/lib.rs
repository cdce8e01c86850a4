//! kd-inspect library crate.
//!
//! Replays recorded embedding traffic (one JSON message per line) through the
//! kd-core guards, decoders, and drill correlator, and summarises persisted
//! layouts.
//!
//! This is a developer tool built on top of the kd-core contracts.  It is not
//! part of the embedding protocol: nothing here is posted to or from the
//! iframe, and hosts and KD never depend on it.  Its reports, config keys and
//! strict-mode policy are the tool's own and may change independently of the
//! message contracts defined in `kd-core`.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! NDJSON file / stdin                 layout JSON file
//!         ↓                                  ↓
//! [kd-inspect]
//!   ├── domain/           Pure types: InspectConfig, MessageReport, Summary
//!   ├── application/      MessageInspector, layout_stats, ReportSink trait
//!   └── infrastructure/
//!         ├── config_file/ TOML config loading
//!         └── json_sink/   ReportSink writing JSON lines
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `kd-core`; output goes through the
//!   [`application::ReportSink`] trait so it can be tested with a mock.
//! - `infrastructure` does the file and stdout I/O.

/// Domain layer: configuration and report types (no I/O).
pub mod domain;

/// Application layer: message and layout inspection.
pub mod application;

/// Infrastructure layer: config file loading and report output.
pub mod infrastructure;
