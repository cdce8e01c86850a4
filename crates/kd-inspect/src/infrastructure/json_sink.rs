//! [`ReportSink`] that writes newline-delimited JSON.
//!
//! Each report becomes one line.  The summary is written last, wrapped as
//! `{"summary": {...}}` so it can be told apart from the reports.

use std::io::Write;

use serde::Serialize;

use crate::application::{InspectError, ReportSink};
use crate::domain::{MessageReport, Summary};

/// Writes reports as JSON lines to any writer.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a Summary,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<(), InspectError> {
        let line = serde_json::to_string(value)?;
        writeln!(self.writer, "{line}").map_err(InspectError::Write)
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn report(&mut self, report: &MessageReport) -> Result<(), InspectError> {
        self.write_line(report)
    }

    fn summary(&mut self, summary: &Summary) -> Result<(), InspectError> {
        self.write_line(&SummaryLine { summary })?;
        self.writer.flush().map_err(InspectError::Write)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
