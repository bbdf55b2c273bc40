//! Codec boundary - structured decoding with an opaque fallback.
//!
//! The multilang protocol is JSON, but the handshake is allowed to carry
//! bare strings where some hosts would send a mapping. [`decode`] therefore
//! never fails: a message that does not decode to a JSON object is returned
//! unchanged as an opaque string.
//!
//! # Example
//!
//! ```
//! use multilang_client::codec::{decode, Payload};
//!
//! match decode(r#"{"command":"next"}"#) {
//!     Payload::Structured(map) => assert_eq!(map["command"], "next"),
//!     Payload::Opaque(_) => unreachable!(),
//! }
//!
//! assert_eq!(decode("/tmp/pids"), Payload::Opaque("/tmp/pids".to_string()));
//! ```

use serde_json::{Map, Value};

/// Result of decoding one framed message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The message decoded to a JSON object.
    Structured(Map<String, Value>),
    /// Anything else: the raw trimmed text, passed through unchanged.
    Opaque(String),
}

/// Decode one framed message.
///
/// Only a JSON object counts as structured; numbers, arrays and bare
/// strings all take the opaque fallback.
pub fn decode(text: &str) -> Payload {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Payload::Structured(map),
        _ => Payload::Opaque(text.trim().to_string()),
    }
}

/// Encode a value as one line of JSON.
pub fn encode<T: serde::Serialize>(value: &T) -> crate::error::Result<String> {
    Ok(serde_json::to_string(value)?)
}
