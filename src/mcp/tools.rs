//! Tool descriptors, argument validation and the `tools/*` methods.
//!
//! Tools are named operations a client invokes with a JSON object of
//! arguments. Each tool implements [`Tool`], describing itself through an
//! [`InputSchema`] that the dispatcher enforces before the tool ever runs.
//!
//! # Examples
//!
//! ## Implementing a tool
//!
//! ```
//! use weather_server::mcp::tools::{Argument, ArgumentType, Arguments, InputSchema, Tool, ToolCallError};
//!
//! struct Echo;
//!
//! impl Tool for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Echoes back the input message"
//!     }
//!
//!     fn input_schema(&self) -> InputSchema {
//!         InputSchema::new(vec![
//!             Argument::new("message", ArgumentType::String, "Message to echo", true),
//!             Argument::new("times", ArgumentType::Integer, "Repeat count", false).with_default(1),
//!         ])
//!     }
//!
//!     fn call(&self, arguments: Arguments) -> Result<serde_json::Value, ToolCallError> {
//!         let message = arguments
//!             .get("message")
//!             .and_then(|v| v.as_str())
//!             .ok_or_else(|| ToolCallError::new("message must be a string"))?;
//!         let times = arguments.get("times").and_then(|v| v.as_u64()).unwrap_or(1);
//!         Ok(message.repeat(times as usize).into())
//!     }
//! }
//!
//! // Validation applies the default before the tool runs.
//! let mut arguments = Arguments::new();
//! arguments.insert("message".to_string(), "hi".into());
//! let arguments = Echo.input_schema().validate(arguments).unwrap();
//! assert_eq!(Echo.call(arguments).unwrap(), serde_json::json!("hi"));
//! ```

use crate::jrpc::{Error, Request, Response};
use crate::registry::{LookupError, Registry};
use logwise::privacy::LogIt;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::AssertUnwindSafe;

/// Arguments passed to a tool, keyed by argument name.
pub type Arguments = HashMap<String, serde_json::Value>;

/// Trait for implementing MCP tools.
///
/// Implementations may block (for example to simulate a slow backend). The
/// transport serves one request at a time, so a blocking tool delays the next
/// frame but never overlaps with another call.
pub trait Tool: Send + Sync {
    /// Returns the unique name of the tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the schema defining the tool's input parameters.
    fn input_schema(&self) -> InputSchema;

    /// Executes the tool with arguments that already passed [`InputSchema::validate`].
    ///
    /// The returned value is sent to the client as pretty-printed JSON text.
    fn call(&self, arguments: Arguments) -> Result<serde_json::Value, ToolCallError>;
}

/// The JSON type an argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl ArgumentType {
    /// Whether `value` has this type.
    pub fn matches(self, value: &serde_json::Value) -> bool {
        match self {
            ArgumentType::String => value.is_string(),
            ArgumentType::Number => value.is_number(),
            ArgumentType::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            ArgumentType::Boolean => value.is_boolean(),
            ArgumentType::Object => value.is_object(),
            ArgumentType::Array => value.is_array(),
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgumentType::String => "string",
            ArgumentType::Number => "number",
            ArgumentType::Integer => "integer",
            ArgumentType::Boolean => "boolean",
            ArgumentType::Object => "object",
            ArgumentType::Array => "array",
        };
        f.write_str(name)
    }
}

/// Schema of a single argument, in JSON Schema form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Property {
    r#type: ArgumentType,
    description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    allowed: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<serde_json::Value>,
}

impl Property {
    fn check(&self, name: &str, value: &serde_json::Value) -> Result<(), ValidationError> {
        if !self.r#type.matches(value) {
            return Err(ValidationError::WrongType {
                name: name.to_string(),
                expected: self.r#type,
            });
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                return Err(ValidationError::NotAllowed {
                    name: name.to_string(),
                    allowed: serde_json::Value::Array(allowed.clone()).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Schema defining a tool's input parameters.
///
/// Serializes as a JSON Schema object. Properties are kept sorted by name so
/// repeated listings are byte-for-byte identical.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputSchema {
    /// The schema type (always "object" for tool parameters)
    r#type: String,
    properties: BTreeMap<String, Property>,
    required: Vec<String>,
}

/// Represents a single parameter for a tool.
///
/// ```
/// use weather_server::mcp::tools::{Argument, ArgumentType};
///
/// let units = Argument::new("units", ArgumentType::String, "Temperature units", false)
///     .one_of(["celsius", "fahrenheit"])
///     .with_default("celsius");
/// ```
pub struct Argument {
    name: String,
    r#type: ArgumentType,
    description: String,
    required: bool,
    allowed: Option<Vec<serde_json::Value>>,
    default: Option<serde_json::Value>,
}

impl Argument {
    /// Creates a new tool argument specification.
    pub fn new(
        name: impl Into<String>,
        r#type: ArgumentType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            r#type,
            description: description.into(),
            required,
            allowed: None,
            default: None,
        }
    }

    /// Restricts the argument to the given values.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<serde_json::Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Value used when an optional argument is omitted.
    ///
    /// Ignored for required arguments: a missing required argument is always
    /// an error.
    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl InputSchema {
    /// Creates a new input schema from a collection of arguments.
    pub fn new<A: IntoIterator<Item = Argument>>(arguments: A) -> Self {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        for argument in arguments {
            if argument.required {
                required.push(argument.name.clone());
            }
            properties.insert(
                argument.name,
                Property {
                    r#type: argument.r#type,
                    description: argument.description,
                    allowed: argument.allowed,
                    default: argument.default,
                },
            );
        }
        InputSchema {
            r#type: "object".to_string(),
            properties,
            required,
        }
    }

    /// Checks `arguments` against this schema.
    ///
    /// Required arguments must be present. Present declared arguments must
    /// match their type and allowed values. Undeclared arguments are passed
    /// through unchecked. Omitted optional arguments receive their default,
    /// which is held to the same type and allowed values.
    pub fn validate(&self, mut arguments: Arguments) -> Result<Arguments, ValidationError> {
        if let Some(missing) = self.required.iter().find(|name| !arguments.contains_key(*name)) {
            return Err(ValidationError::Missing(missing.clone()));
        }
        for (name, property) in &self.properties {
            match arguments.get(name) {
                Some(value) => property.check(name, value)?,
                None => {
                    if let Some(default) = &property.default {
                        property
                            .check(name, default)
                            .map_err(|_| ValidationError::BadDefault(name.clone()))?;
                        arguments.insert(name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(arguments)
    }
}

/// Arguments that do not satisfy a tool's [`InputSchema`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required argument was omitted.
    #[error("Missing required argument: {0}")]
    Missing(String),
    /// An argument has the wrong JSON type.
    #[error("Invalid argument '{name}': expected {expected}")]
    WrongType { name: String, expected: ArgumentType },
    /// An argument is not one of its allowed values.
    #[error("Invalid argument '{name}': expected one of {allowed}")]
    NotAllowed { name: String, allowed: String },
    /// The schema's own default for an omitted argument does not satisfy it.
    #[error("Invalid default for argument '{0}'")]
    BadDefault(String),
}

/// A failure reported by a tool implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ToolCallError {
    message: String,
}

impl ToolCallError {
    /// Creates an error whose message is shown to the client as-is.
    pub fn new(message: impl Into<String>) -> Self {
        ToolCallError {
            message: message.into(),
        }
    }
}

/// Everything that can go wrong between receiving `tools/call` and getting a value back.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CallError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Tool(#[from] ToolCallError),
    #[error("Tool '{0}' panicked")]
    Panicked(String),
    #[error("Tool '{0}' returned a result that could not be encoded: {1}")]
    Encode(String, #[source] serde_json::Error),
}

/// A collection of tool information, the result of `tools/list`.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ToolList {
    pub tools: Vec<ToolInfo>,
}

/// Metadata about a tool.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl ToolInfo {
    pub(crate) fn from_tool(tool: &dyn Tool) -> Self {
        ToolInfo {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, serde::Deserialize, Clone)]
pub(crate) struct ToolCallParams {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) arguments: Arguments,
}

/// Content returned by a tool.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[non_exhaustive]
pub enum ToolContent {
    Text { text: String },
}

impl From<String> for ToolContent {
    fn from(text: String) -> Self {
        ToolContent::Text { text }
    }
}

impl From<&str> for ToolContent {
    fn from(text: &str) -> Self {
        ToolContent::Text {
            text: text.to_string(),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// The result of `tools/call`, successful or not.
///
/// Tool failures are reported in-band with `isError: true` rather than as a
/// JSON-RPC error, so the client can show the message to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolCallResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResponse {
    /// Wraps `value` as a single pretty-printed JSON text block.
    pub fn json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(ToolCallResponse {
            content: vec![text.into()],
            is_error: false,
        })
    }

    /// A soft error carrying `message` as its only text block.
    pub fn error(message: impl Into<String>) -> Self {
        ToolCallResponse {
            content: vec![ToolContent::from(message.into())],
            is_error: true,
        }
    }
}

/// Lists every registered tool in registration order.
pub(crate) fn list_int(registry: &Registry) -> ToolList {
    ToolList {
        tools: registry.tools().map(|tool| ToolInfo::from_tool(tool)).collect(),
    }
}

/// Processes a `tools/list` request.
pub(crate) fn list(registry: &Registry, request: Request) -> Response<ToolList> {
    Response::new(list_int(registry), request.id)
}

fn try_call(registry: &Registry, params: ToolCallParams) -> Result<ToolCallResponse, CallError> {
    let tool = registry.tool(&params.name)?;
    let arguments = tool.input_schema().validate(params.arguments)?;
    let value = std::panic::catch_unwind(AssertUnwindSafe(|| tool.call(arguments)))
        .map_err(|_| CallError::Panicked(params.name.clone()))??;
    ToolCallResponse::json(&value).map_err(|e| CallError::Encode(params.name, e))
}

/// Looks up, validates and runs a tool, folding every failure into a soft error.
pub(crate) fn call_imp(registry: &Registry, params: ToolCallParams) -> ToolCallResponse {
    let name = params.name.clone();
    match try_call(registry, params) {
        Ok(response) => response,
        Err(e) => {
            logwise::warn_sync!(
                "tools/call {name} failed: {error}",
                name = LogIt(&name),
                error = LogIt(&e)
            );
            ToolCallResponse::error(e.to_string())
        }
    }
}

/// Processes a `tools/call` request.
///
/// Malformed `params` are a protocol error; anything that goes wrong after
/// the tool name is known is reported through [`ToolCallResponse::error`].
pub(crate) fn call(registry: &Registry, request: Request) -> Response<ToolCallResponse> {
    let params = match request.params {
        Some(params) => match serde_json::from_value::<ToolCallParams>(params) {
            Ok(params) => params,
            Err(err) => return Response::err(Error::invalid_params(err.to_string()), request.id),
        },
        None => {
            return Response::err(
                Error::invalid_params("No parameters provided".to_string()),
                request.id,
            );
        }
    };
    Response::new(call_imp(registry, params), request.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather_schema() -> InputSchema {
        InputSchema::new(vec![
            Argument::new("city", ArgumentType::String, "The city name", true),
            Argument::new("units", ArgumentType::String, "Temperature units", false)
                .one_of(["celsius", "fahrenheit"])
                .with_default("celsius"),
        ])
    }

    fn args(value: serde_json::Value) -> Arguments {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn default_is_applied_to_missing_optional() {
        let validated = weather_schema().validate(args(json!({"city": "Paris"}))).unwrap();
        assert_eq!(validated.get("units"), Some(&json!("celsius")));
    }

    #[test]
    fn missing_required_names_the_field() {
        let err = weather_schema().validate(args(json!({"units": "celsius"}))).unwrap_err();
        assert_eq!(err, ValidationError::Missing("city".to_string()));
        assert_eq!(err.to_string(), "Missing required argument: city");
    }

    #[test]
    fn required_field_with_default_is_still_required() {
        let schema = InputSchema::new(vec![
            Argument::new("city", ArgumentType::String, "The city name", true).with_default("Oslo"),
        ]);
        let err = schema.validate(Arguments::new()).unwrap_err();
        assert_eq!(err, ValidationError::Missing("city".to_string()));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = weather_schema().validate(args(json!({"city": 42}))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument 'city': expected string");
    }

    #[test]
    fn value_outside_enum_is_rejected() {
        let err = weather_schema()
            .validate(args(json!({"city": "Paris", "units": "kelvin"})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Invalid argument 'units': expected one of ["celsius","fahrenheit"]"#
        );
    }

    #[test]
    fn extra_arguments_pass_through() {
        let validated = weather_schema()
            .validate(args(json!({"city": "Paris", "verbose": true})))
            .unwrap();
        assert_eq!(validated.get("verbose"), Some(&json!(true)));
    }

    #[test]
    fn integer_type_rejects_fractions() {
        assert!(ArgumentType::Integer.matches(&json!(3)));
        assert!(ArgumentType::Integer.matches(&json!(-3)));
        assert!(!ArgumentType::Integer.matches(&json!(3.5)));
        assert!(!ArgumentType::Integer.matches(&json!("3")));
        assert!(ArgumentType::Number.matches(&json!(3.5)));
    }

    #[test]
    fn integral_float_counts_as_integer() {
        let schema = InputSchema::new(vec![Argument::new("n", ArgumentType::Integer, "Count", true)]);
        let validated = schema.validate(args(json!({"n": 2.0}))).unwrap();
        assert_eq!(validated.get("n"), Some(&json!(2.0)));
    }

    #[test]
    fn default_outside_enum_never_reaches_the_tool() {
        let schema = InputSchema::new(vec![
            Argument::new("units", ArgumentType::String, "Temperature units", false)
                .one_of(["celsius", "fahrenheit"])
                .with_default("kelvin"),
        ]);
        let err = schema.validate(Arguments::new()).unwrap_err();
        assert_eq!(err, ValidationError::BadDefault("units".to_string()));
        assert_eq!(err.to_string(), "Invalid default for argument 'units'");
    }

    #[test]
    fn default_of_wrong_type_never_reaches_the_tool() {
        let schema = InputSchema::new(vec![
            Argument::new("n", ArgumentType::Integer, "Count", false).with_default("three"),
        ]);
        assert_eq!(
            schema.validate(Arguments::new()),
            Err(ValidationError::BadDefault("n".to_string()))
        );
    }

    #[test]
    fn schema_serializes_as_json_schema() {
        let value = serde_json::to_value(weather_schema()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "The city name"},
                    "units": {
                        "type": "string",
                        "description": "Temperature units",
                        "enum": ["celsius", "fahrenheit"],
                        "default": "celsius"
                    }
                },
                "required": ["city"]
            })
        );
    }

    #[test]
    fn success_response_omits_is_error() {
        let response = ToolCallResponse::json(&json!({"a": 1})).unwrap();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "{\n  \"a\": 1\n}"}]}));
    }

    #[test]
    fn error_response_sets_is_error() {
        let value = serde_json::to_value(ToolCallResponse::error("Unknown tool: x")).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "Unknown tool: x"}], "isError": true})
        );
    }
}
