//! Full (deep) decoding and encoding of embedding messages.
//!
//! Where the type-guards only compare the `type` tag, the functions here
//! validate the whole envelope: the product name and every body field.
//!
//! ```text
//! untyped JSON ──get_event_type──▶ kind ──KdCommandType / KdEventType──▶ direction
//!                                              │
//!                                              ▼
//!                                  serde: MessageEnvelope<KdCommand | KdEvent>
//! ```
//!
//! Decoding borrows the input [`Value`] (no clone) because `&Value`
//! implements serde's `Deserializer`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::protocol::commands::{KdCommand, KdCommandType};
use crate::protocol::common::{
    get_event_type, GdcEvent, MessageEnvelope, COMMAND_FAILED_EVENT_TYPE,
};
use crate::protocol::events::{KdEvent, KdEventType};

/// Errors that can occur while decoding or encoding a message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The value has no string `data.type` tag.
    #[error("not a message envelope: missing or non-string data.type")]
    NotAnEnvelope,

    /// The `type` tag is a string but not a kind this decoder knows.
    #[error("unknown message kind: {0}")]
    UnknownKind(String),

    /// The kind is known but the product or body does not match its shape.
    #[error("malformed {kind} message: {source}")]
    MalformedBody {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The message could not be serialised.
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Any message the protocol defines, after full decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    /// Host → KD.
    Command(MessageEnvelope<KdCommand>),
    /// KD → host.
    Event(MessageEnvelope<KdEvent>),
    /// The generic failure event.
    Failure(MessageEnvelope<GdcEvent>),
}

impl DecodedMessage {
    /// Returns the wire kind of the decoded message.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedMessage::Command(env) => env.data.command_type().as_str(),
            DecodedMessage::Event(env) => env.data.event_type().as_str(),
            DecodedMessage::Failure(_) => COMMAND_FAILED_EVENT_TYPE,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes and validates a command envelope.
///
/// # Errors
///
/// - [`ProtocolError::NotAnEnvelope`] if there is no string `data.type`.
/// - [`ProtocolError::UnknownKind`] if the tag is not a command kind.
/// - [`ProtocolError::MalformedBody`] if the product or body is invalid.
///
/// # Example
///
/// ```rust
/// use kd_core::{decode_command, KdCommand};
/// use serde_json::json;
///
/// let value = json!({"product": "kpiDashboard", "data": {"type": "setSize", "height": 480}});
/// let envelope = decode_command(&value).unwrap();
/// assert!(matches!(envelope.data, KdCommand::SetSize(ref body) if body.height == 480.0));
/// ```
pub fn decode_command(value: &Value) -> Result<MessageEnvelope<KdCommand>, ProtocolError> {
    let kind = get_event_type(value).ok_or(ProtocolError::NotAnEnvelope)?;
    if KdCommandType::try_from(kind).is_err() {
        return Err(ProtocolError::UnknownKind(kind.to_string()));
    }
    decode_as(kind, value)
}

/// Decodes and validates an event envelope.
///
/// # Errors
///
/// Same as [`decode_command`], for event kinds.
pub fn decode_event(value: &Value) -> Result<MessageEnvelope<KdEvent>, ProtocolError> {
    let kind = get_event_type(value).ok_or(ProtocolError::NotAnEnvelope)?;
    if KdEventType::try_from(kind).is_err() {
        return Err(ProtocolError::UnknownKind(kind.to_string()));
    }
    decode_as(kind, value)
}

/// Decodes any message, choosing the direction from its kind tag.
///
/// # Errors
///
/// Same as [`decode_command`], for every kind the protocol defines.
pub fn decode_message(value: &Value) -> Result<DecodedMessage, ProtocolError> {
    let kind = get_event_type(value).ok_or(ProtocolError::NotAnEnvelope)?;
    if KdCommandType::try_from(kind).is_ok() {
        decode_as(kind, value).map(DecodedMessage::Command)
    } else if KdEventType::try_from(kind).is_ok() {
        decode_as(kind, value).map(DecodedMessage::Event)
    } else if kind == COMMAND_FAILED_EVENT_TYPE {
        decode_as(kind, value).map(DecodedMessage::Failure)
    } else {
        Err(ProtocolError::UnknownKind(kind.to_string()))
    }
}

/// Serialises an envelope to a JSON value ready to be posted.
///
/// # Errors
///
/// Returns [`ProtocolError::Serialize`] if serde fails.
pub fn encode_message<T: Serialize>(envelope: &MessageEnvelope<T>) -> Result<Value, ProtocolError> {
    serde_json::to_value(envelope).map_err(ProtocolError::Serialize)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn decode_as<'de, T>(kind: &str, value: &'de Value) -> Result<MessageEnvelope<T>, ProtocolError>
where
    T: Deserialize<'de>,
{
    MessageEnvelope::<T>::deserialize(value).map_err(|source| {
        debug!(kind, error = %source, "message body does not match its kind");
        ProtocolError::MalformedBody {
            kind: kind.to_string(),
            source,
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
