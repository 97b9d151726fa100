//! Normalization adapter for duck-typed transport response shapes.
//!
//! Client libraries for the underlying transport are not consistent about
//! object shapes across versions: the type discriminator arrives as
//! `className` or `_`, field names flip between camelCase and snake_case,
//! and numeric IDs may arrive as JSON numbers or decimal strings. This
//! module decodes all of those variants exactly once, at the transport
//! boundary, into the canonical [`Message`] record. Nothing past this
//! adapter ever sees an alias.

use serde::Deserialize;
use serde_json::Value;

use super::{MediaRef, Message};

/// A numeric field that may arrive as a JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Int(i64),
    Text(String),
}

impl WireScalar {
    fn as_i64(&self) -> Option<i64> {
        match self {
            WireScalar::Int(n) => Some(*n),
            WireScalar::Text(s) => s.trim().parse().ok(),
        }
    }

    fn into_string(self) -> String {
        match self {
            WireScalar::Int(n) => n.to_string(),
            WireScalar::Text(s) => s,
        }
    }
}

/// The `fromId` sub-object, which may carry the author under either casing,
/// or be a bare scalar in older shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireFromId {
    Peer {
        #[serde(default, rename = "userId", alias = "user_id")]
        user_id: Option<WireScalar>,
    },
    Bare(WireScalar),
}

impl WireFromId {
    fn user_id(&self) -> Option<i64> {
        match self {
            WireFromId::Peer { user_id } => user_id.as_ref().and_then(WireScalar::as_i64),
            WireFromId::Bare(scalar) => scalar.as_i64(),
        }
    }
}

/// Raw message record as produced by the transport client library.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    /// Type discriminator: `Message`/`message` for real messages, other
    /// values for service records that carry no card.
    #[serde(default, rename = "className", alias = "_")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub id: Option<WireScalar>,
    /// Message body under any of its historical names.
    #[serde(default, rename = "message", alias = "rawText", alias = "text")]
    pub message: Option<String>,
    #[serde(default, rename = "fromId", alias = "from_id")]
    pub from_id: Option<WireFromId>,
    #[serde(default)]
    pub date: Option<WireScalar>,
    #[serde(default)]
    pub media: Option<Value>,
    #[serde(default, rename = "groupedId", alias = "grouped_id")]
    pub grouped_id: Option<WireScalar>,
}

/// Normalizes one raw record into the canonical [`Message`].
///
/// Returns `None` for service records, records of other types, and records
/// missing an ID or date; those carry no card and are skipped silently.
pub fn normalize_message(wire: WireMessage) -> Option<Message> {
    match wire.class_name.as_deref() {
        Some("Message") | Some("message") => {}
        _ => return None,
    }
    let id = wire.id.as_ref().and_then(WireScalar::as_i64)?;
    let date = wire.date.as_ref().and_then(WireScalar::as_i64)?;
    Some(Message {
        id,
        text: wire.message.unwrap_or_default(),
        from_user_id: wire.from_id.as_ref().and_then(WireFromId::user_id),
        date,
        media: wire.media.filter(|m| !m.is_null()).map(MediaRef),
        grouped_id: wire.grouped_id.map(WireScalar::into_string),
    })
}

/// Decodes and normalizes a batch of raw JSON records, dropping anything
/// that is not a well-formed message.
pub fn normalize_messages(raw: Vec<Value>) -> Vec<Message> {
    raw.into_iter()
        .filter_map(|value| serde_json::from_value::<WireMessage>(value).ok())
        .filter_map(normalize_message)
        .collect()
}
