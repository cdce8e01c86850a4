//! # kd-core
//!
//! Shared contract library for embedding the KPI dashboard ("KD") inside a
//! host page via an iframe.
//!
//! This crate has no I/O, no transport, and no dashboard logic.  It defines
//! the *shape* of everything that crosses the window boundary and the
//! predicates used to recognise those shapes.
//!
//! # Architecture overview (for beginners)
//!
//! A host page talks to the embedded dashboard with `postMessage`.  Both
//! sides exchange JSON objects of the form:
//!
//! ```json
//! {"product": "kpiDashboard", "data": {"type": "setSize", "height": 480}}
//! ```
//!
//! This crate is split into two independent groups:
//!
//! - **`protocol`** – The embedding protocol.  Commands travel from the host
//!   to the dashboard, events travel back.  Every kind has a cheap type-guard
//!   (`is_set_size_command_data`, …) that only looks at the `type` tag, and a
//!   separate full decoder (`decode_command`, `decode_event`) that validates
//!   the body as well.
//!
//! - **`domain`** – The persisted fluid-layout format: a tree of rows and
//!   columns whose cells hold either a widget reference or a nested layout.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kd_core::KdCommand` instead of `kd_core::protocol::commands::KdCommand`.
pub use domain::layout::{
    Breakpoint, ColSize, Column, Content, FluidLayout, Height, LayoutError, PersistedWidget,
    Row, SectionHeader, Size,
};
pub use protocol::codec::{
    decode_command, decode_event, decode_message, encode_message, DecodedMessage, ProtocolError,
};
pub use protocol::commands::{KdCommand, KdCommandType};
pub use protocol::common::{get_event_type, MessageEnvelope, ObjQualifier, ProductName};
pub use protocol::correlation::{DrillToUrlCorrelator, Resolution};
pub use protocol::events::{KdEvent, KdEventType};
