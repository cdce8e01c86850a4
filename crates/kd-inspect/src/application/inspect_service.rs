//! Message and layout inspection.
//!
//! # How a line is inspected (for beginners)
//!
//! 1. The line is parsed as JSON.  Blank lines are skipped.
//! 2. [`get_event_type`] reads the kind tag.  This never fails; a value
//!    without a string `data.type` is simply not an embedding message.
//! 3. [`decode_message`] validates the product and body for that kind.
//! 4. Decoded events go through a [`DrillToUrlCorrelator`] so that
//!    `drillToUrlResolved` events can be paired with their start.
//!
//! Output goes through the [`ReportSink`] trait.  The binary writes JSON
//! lines to stdout; tests use a mock.

use std::io::{self, BufRead};

use kd_core::protocol::{get_product, CorrelationError, COMMAND_FAILED_EVENT_TYPE};
use kd_core::{
    decode_message, get_event_type, DecodedMessage, DrillToUrlCorrelator, FluidLayout, KdCommandType,
    KdEvent, KdEventType, LayoutError, ProtocolError, Resolution,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Direction, DrillOutcome, InspectConfig, LayoutStats, MessageReport, Summary};

/// Errors that can occur during inspection.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The input could not be read.
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    /// A report could not be written.
    #[error("failed to write report: {0}")]
    Write(#[source] io::Error),

    /// A report could not be serialised.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Strict mode stopped at an offending message.
    #[error("line {line}: {reason}")]
    StrictViolation { line: usize, reason: String },

    /// The layout file is not a valid layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Destination of inspection output.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSink {
    /// Receives the report of one message.
    fn report(&mut self, report: &MessageReport) -> Result<(), InspectError>;

    /// Receives the totals once the input is exhausted.
    fn summary(&mut self, summary: &Summary) -> Result<(), InspectError>;
}

/// Replays recorded messages and keeps running totals.
#[derive(Debug)]
pub struct MessageInspector {
    config: InspectConfig,
    correlator: DrillToUrlCorrelator,
    summary: Summary,
}

impl MessageInspector {
    pub fn new(config: InspectConfig) -> Self {
        Self {
            config,
            correlator: DrillToUrlCorrelator::new(),
            summary: Summary::default(),
        }
    }

    /// Inspects every line of `input`, forwarding reports to `sink`.
    ///
    /// # Errors
    ///
    /// - [`InspectError::Read`] if `input` fails.
    /// - [`InspectError::StrictViolation`] in strict mode, after the
    ///   offending report has been passed to the sink.
    /// - Any error returned by the sink.
    pub fn run<R: BufRead, S: ReportSink>(
        mut self,
        input: R,
        sink: &mut S,
    ) -> Result<Summary, InspectError> {
        for (index, line) in input.lines().enumerate() {
            let line = line.map_err(InspectError::Read)?;
            let Some(report) = self.inspect_line(index + 1, &line) else {
                continue;
            };
            sink.report(&report)?;
            if let Some(reason) = self.strict_violation(&report) {
                warn!(line = report.line, %reason, "strict mode violation");
                return Err(InspectError::StrictViolation {
                    line: report.line,
                    reason,
                });
            }
        }

        let summary = self.finish();
        info!(
            total = summary.total(),
            invalid = summary.invalid_bodies,
            pending = summary.pending_drills.len(),
            "inspection finished"
        );
        sink.summary(&summary)?;
        Ok(summary)
    }

    /// Inspects one line.  Returns `None` for blank lines.
    pub fn inspect_line(&mut self, line: usize, text: &str) -> Option<MessageReport> {
        if text.trim().is_empty() {
            return None;
        }

        let report = match serde_json::from_str::<Value>(text) {
            Ok(value) => self.inspect_value(line, &value),
            Err(e) => {
                debug!(line, error = %e, "line is not JSON");
                MessageReport {
                    line,
                    direction: Direction::Unknown,
                    kind: None,
                    product: None,
                    valid_body: false,
                    error: Some(format!("invalid JSON: {e}")),
                    drill: None,
                }
            }
        };
        self.summary.record(&report);
        Some(report)
    }

    /// Totals so far, with the drills that are still pending.
    pub fn finish(mut self) -> Summary {
        self.summary.pending_drills = self
            .correlator
            .pending_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.summary
    }

    fn inspect_value(&mut self, line: usize, value: &Value) -> MessageReport {
        let kind = get_event_type(value).map(str::to_string);
        let product = get_product(value);
        let mut report = MessageReport {
            line,
            direction: kind.as_deref().map_or(Direction::Unknown, classify),
            kind,
            product,
            valid_body: false,
            error: None,
            drill: None,
        };

        match decode_message(value) {
            Ok(DecodedMessage::Event(envelope)) => {
                report.valid_body = true;
                report.drill = self.track_drill(&envelope.data);
            }
            Ok(_) => report.valid_body = true,
            Err(ProtocolError::NotAnEnvelope | ProtocolError::UnknownKind(_)) => {}
            Err(e) => report.error = Some(e.to_string()),
        }
        report
    }

    fn track_drill(&mut self, event: &KdEvent) -> Option<DrillOutcome> {
        match self.correlator.observe(event) {
            Ok(Some(Resolution::Matched { id, url })) => Some(DrillOutcome::Matched { id, url }),
            Ok(Some(Resolution::Orphaned { id, url })) => Some(DrillOutcome::Orphaned { id, url }),
            Ok(None) => match event {
                KdEvent::DrillToUrlStarted(body) => Some(DrillOutcome::Started {
                    id: body.id.clone(),
                }),
                _ => None,
            },
            Err(CorrelationError::DuplicateStart(id)) => Some(DrillOutcome::DuplicateStart { id }),
        }
    }

    fn strict_violation(&self, report: &MessageReport) -> Option<String> {
        if !self.config.strict {
            return None;
        }
        if report.kind.is_none() && report.error.is_some() {
            return report.error.clone();
        }
        if report.direction == Direction::Unknown {
            return None;
        }
        if !report.valid_body {
            return Some(
                report
                    .error
                    .clone()
                    .unwrap_or_else(|| "message body does not decode".to_string()),
            );
        }
        match report.product {
            Some(product) if product != self.config.expected_product => Some(format!(
                "product {product} differs from expected {}",
                self.config.expected_product
            )),
            _ => None,
        }
    }
}

/// Direction of a kind tag.
fn classify(kind: &str) -> Direction {
    if KdCommandType::try_from(kind).is_ok() {
        Direction::Command
    } else if KdEventType::try_from(kind).is_ok() {
        Direction::Event
    } else if kind == COMMAND_FAILED_EVENT_TYPE {
        Direction::Failure
    } else {
        Direction::Unknown
    }
}

/// Parses a persisted layout and measures it.
///
/// # Errors
///
/// Returns [`InspectError::Layout`] if `text` is not a valid layout.
pub fn layout_stats(text: &str) -> Result<LayoutStats, InspectError> {
    let layout = FluidLayout::from_json(text)?;
    Ok(LayoutStats {
        rows: layout.rows().len(),
        columns: layout.column_count(),
        widgets: layout.widgets().len(),
        depth: layout.depth(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
