//! Frame codec for inbound and outbound JSON-RPC messages.
//!
//! A frame is one line of UTF-8 JSON. [`decode`] turns a frame into a
//! [`Message`], which is either a [`Request`] (carries an `id`, expects a
//! reply) or a [`Notification`] (no `id`, never answered). [`encode`] is the
//! inverse for anything serializable, normally a [`Response`](crate::jrpc::Response).
//!
//! Decoding never panics; a bad frame yields a [`DecodeError`] that the
//! transport logs before moving on to the next frame.
//!
//! ```
//! use weather_server::messages::{decode, encode, Message};
//!
//! let frame = br#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#;
//! let Message::Request(request) = decode(frame).unwrap() else {
//!     panic!("expected a request");
//! };
//! assert_eq!(request.method, "ping");
//!
//! let bytes = encode(&request).unwrap();
//! assert!(bytes.ends_with(b"\n"));
//! assert_eq!(decode(&bytes[..bytes.len() - 1]).unwrap(), Message::Request(request));
//! ```

use crate::jrpc::{Notification, Request, VERSION};
use serde::Serialize;

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A JSON-RPC request message that expects a response.
    Request(Request),
    /// A JSON-RPC notification message that does not expect a response.
    Notification(Notification),
}

impl Message {
    /// The method named by this message.
    pub fn method(&self) -> &str {
        match self {
            Message::Request(request) => &request.method,
            Message::Notification(notification) => &notification.method,
        }
    }
}

/// Reasons a frame could not be turned into a [`Message`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame is not valid JSON (this includes invalid UTF-8).
    #[error("frame is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    /// The frame is JSON, but not a JSON object.
    #[error("frame is not a JSON object")]
    NotAnObject,
    /// The object has no string `method` field.
    #[error("frame has no method")]
    MissingMethod,
    /// The `jsonrpc` field is absent or is not "2.0".
    #[error("unsupported jsonrpc version: {0:?}")]
    UnsupportedVersion(Option<serde_json::Value>),
    /// The object has the right envelope but its fields have the wrong shape.
    #[error("malformed message: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Failure to serialize an outbound frame.
#[derive(Debug, thiserror::Error)]
#[error("could not encode frame: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Decodes a single frame.
///
/// Trailing whitespace (including the line terminator) is tolerated.
pub fn decode(frame: &[u8]) -> Result<Message, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(frame).map_err(DecodeError::Syntax)?;
    let serde_json::Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject);
    };
    match object.get("jsonrpc") {
        Some(serde_json::Value::String(v)) if v == VERSION => {}
        other => return Err(DecodeError::UnsupportedVersion(other.cloned())),
    }
    if !object.get("method").is_some_and(serde_json::Value::is_string) {
        return Err(DecodeError::MissingMethod);
    }
    let has_id = object.contains_key("id");
    let value = serde_json::Value::Object(object);
    if has_id {
        serde_json::from_value(value)
            .map(Message::Request)
            .map_err(DecodeError::Shape)
    } else {
        serde_json::from_value(value)
            .map(Message::Notification)
            .map_err(DecodeError::Shape)
    }
}

/// Encodes a message as a single newline-terminated frame.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    Ok(bytes)
}
