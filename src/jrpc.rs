//! JSON-RPC 2.0 message types.
//!
//! This module provides the request, notification, response and error objects
//! exchanged with an MCP client. Framing (how these objects are cut out of a
//! byte stream) lives in [`crate::messages`]; this module only describes their
//! JSON shape.
//!
//! # Protocol Details
//!
//! JSON-RPC 2.0 messages are JSON objects that contain:
//! - A `jsonrpc` field with the value `"2.0"`
//! - Method information (`method` field)
//! - Optional parameters (`params` field)
//! - An identifier (`id` field) for requests/responses (absent for notifications)
//!
//! # Examples
//!
//! ```
//! use weather_server::jrpc::{Error, Request, Response};
//! use serde_json::json;
//!
//! let request = Request::new("tools/list".to_string(), None, json!(1));
//!
//! // Answer it
//! let response = Response::new(json!({"tools": []}), request.id.clone());
//! assert_eq!(response.result, Some(json!({"tools": []})));
//!
//! // Or refuse it
//! let refused: Response<serde_json::Value> =
//!     Response::err(Error::unknown_method("bogus"), request.id);
//! assert_eq!(refused.error.unwrap().code, -32601);
//! ```

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The only protocol version this crate speaks.
pub const VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request.
///
/// Represents a method call that expects a response. The `id` is opaque to the
/// server; it is copied verbatim into the matching [`Response`].
///
/// # Examples
///
/// ```
/// use weather_server::jrpc::Request;
/// use serde_json::json;
///
/// let json_str = r#"{
///     "jsonrpc": "2.0",
///     "method": "ping",
///     "id": 99
/// }"#;
/// let request: Request = serde_json::from_str(json_str).unwrap();
/// assert_eq!(request.method, "ping");
/// assert_eq!(request.id, json!(99));
/// assert!(request.params.is_none());
/// ```
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Request {
    /// The JSON-RPC protocol version (must be "2.0")
    pub jsonrpc: String,
    /// The name of the method to invoke
    pub method: String,
    /// Optional parameters for the method call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Correlation id for this request
    pub id: serde_json::Value,
}

impl Request {
    /// Creates a new JSON-RPC 2.0 request.
    pub fn new(method: String, params: Option<serde_json::Value>, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method,
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 notification.
///
/// A method call without an `id`. The server never answers notifications;
/// clients use them for lifecycle signals such as `notifications/initialized`.
///
/// ```
/// use weather_server::jrpc::Notification;
///
/// let n = Notification::new("notifications/initialized".to_string(), None);
/// let json = serde_json::to_string(&n).unwrap();
/// assert!(!json.contains("\"id\""));
/// ```
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Notification {
    /// The JSON-RPC protocol version (must be "2.0")
    pub jsonrpc: String,
    /// The name of the method to invoke
    pub method: String,
    /// Optional parameters for the method call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Notification {
    /// Creates a new JSON-RPC 2.0 notification.
    pub fn new(method: String, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// A response contains either a `result` field with the return value or an
/// `error` field with error information, but never both.
///
/// The generic type parameter `R` is the type of the successful result, so
/// handlers can return typed results and the dispatcher can [`erase`](Response::erase)
/// them once they all need to travel through the same channel.
///
/// # Examples
///
/// ```
/// use weather_server::jrpc::Response;
/// use serde_json::json;
///
/// let response = Response::new(json!(["item1", "item2"]), json!(99));
///
/// let json_str = serde_json::to_string(&response).unwrap();
/// assert!(json_str.contains("\"result\""));
/// assert!(!json_str.contains("\"error\"")); // error field is omitted when None
/// ```
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Response<R> {
    /// The JSON-RPC protocol version (must be "2.0")
    pub jsonrpc: String,
    /// The result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
    /// Error information if the method call failed (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
    /// The same identifier that was in the request
    pub id: serde_json::Value,
}

impl<R> Response<R> {
    /// Creates a successful response with the given result.
    pub fn new(result: R, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates an error response with the given error.
    pub fn err(e: Error, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: None,
            error: Some(e),
            id,
        }
    }

    /// Converts a typed response into a response with a `serde_json::Value` result.
    ///
    /// If the result cannot be represented as JSON the response is replaced by
    /// an internal error carrying the same id.
    ///
    /// ```
    /// use weather_server::jrpc::Response;
    /// use serde_json::json;
    ///
    /// #[derive(serde::Serialize)]
    /// struct Pong {
    ///     ok: bool,
    /// }
    ///
    /// let erased = Response::new(Pong { ok: true }, json!(1)).erase();
    /// assert_eq!(erased.result, Some(json!({"ok": true})));
    /// ```
    pub fn erase(self) -> Response<serde_json::Value>
    where
        R: Serialize,
    {
        let result = match self.result.map(serde_json::to_value).transpose() {
            Ok(result) => result,
            Err(e) => return Response::err(Error::from_error(e), self.id),
        };
        Response {
            jsonrpc: self.jsonrpc,
            result,
            error: self.error,
            id: self.id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
///
/// # Standard Error Codes
///
/// * `-32601` - Method not found
/// * `-32602` - Invalid params
/// * `-32603` - Internal error
/// * `-32002` - Resource not found (MCP)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Error {
    /// Error code as defined in JSON-RPC 2.0 specification
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional information about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Creates a new error with a custom code and message.
    pub fn new(code: i32, message: String, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message,
            data,
        }
    }

    /// Creates a "Method not found" error (code -32601) naming the method.
    ///
    /// ```
    /// use weather_server::jrpc::Error;
    ///
    /// let error = Error::unknown_method("tools/frobnicate");
    /// assert_eq!(error.code, -32601);
    /// assert_eq!(error.message, "Unknown method: tools/frobnicate");
    /// ```
    pub fn unknown_method(method: &str) -> Self {
        Self::new(-32601, format!("Unknown method: {method}"), None)
    }

    /// Creates an "Invalid params" error (code -32602) with additional details.
    ///
    /// ```
    /// use weather_server::jrpc::Error;
    ///
    /// let error = Error::invalid_params("missing field `uri`".to_string());
    /// assert_eq!(error.code, -32602);
    /// assert_eq!(error.data, Some(serde_json::Value::String("missing field `uri`".to_string())));
    /// ```
    pub fn invalid_params(detail: String) -> Self {
        Self::new(-32602, "Invalid params".to_string(), Some(detail.into()))
    }

    /// Creates a "Resource not found" error (code -32002) naming the uri.
    pub fn unknown_resource(uri: &str) -> Self {
        Self::new(
            -32002,
            format!("Unknown resource: {uri}"),
            Some(serde_json::json!({ "uri": uri })),
        )
    }

    /// Creates an "Internal error" (code -32603) from a standard Rust error.
    pub fn from_error<E: std::error::Error>(error: E) -> Self {
        Self::internal_error(error.to_string())
    }

    /// Creates an "Internal error" (code -32603) with a custom message.
    pub fn internal_error(message: String) -> Self {
        Self::new(-32603, message, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_params_are_omitted_when_absent() {
        let request = Request::new("ping".to_string(), None, json!("a"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "method": "ping", "id": "a"}));
    }

    #[test]
    fn error_response_has_no_result() {
        let response: Response<serde_json::Value> =
            Response::err(Error::unknown_resource("weather://moon"), json!(7));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], json!(-32002));
        assert_eq!(value["error"]["message"], json!("Unknown resource: weather://moon"));
        assert!(value.get("result").is_none());
        assert_eq!(value["id"], json!(7));
    }

    #[test]
    fn erase_keeps_errors() {
        let response: Response<u32> = Response::err(Error::internal_error("boom".to_string()), json!(null));
        let erased = response.erase();
        assert_eq!(erased.error.map(|e| e.code), Some(-32603));
        assert!(erased.result.is_none());
    }
}
