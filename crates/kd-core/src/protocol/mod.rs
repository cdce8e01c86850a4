//! Embedding protocol: envelopes, commands, events, and their type-guards.

pub mod codec;
pub mod commands;
pub mod common;
pub mod contract;
pub mod correlation;
pub mod events;

pub use codec::{decode_command, decode_event, decode_message, encode_message, DecodedMessage, ProtocolError};
pub use commands::*;
pub use common::*;
pub use contract::{CommandContract, DashboardMode, FailureTrigger, RequiredView, ViewState};
pub use correlation::{CorrelationError, DrillToUrlCorrelator, Resolution};
pub use events::*;
