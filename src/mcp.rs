//! Model Context Protocol method dispatch.
//!
//! [`dispatch`] routes a decoded [`Request`] to its handler by method name and
//! always returns exactly one [`Response`]. Unknown methods, unknown tools,
//! invalid arguments and failing handlers all become responses; nothing here
//! can stop the transport loop.

use crate::jrpc::{Error, Notification, Request, Response};
use crate::registry::{Registry, ServerInfo};
use logwise::privacy::LogIt;
use std::collections::HashMap;

pub mod resources;
pub mod tools;

/// Protocol revisions this server understands, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// The request methods the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `initialize`: version negotiation and server identity.
    Initialize,
    /// `ping`: liveness check, answered with an empty object.
    Ping,
    /// `tools/list`
    ListTools,
    /// `tools/call`
    CallTool,
    /// `resources/list`
    ListResources,
    /// `resources/read`
    ReadResource,
}

impl Method {
    const ALL: [Method; 6] = [
        Method::Initialize,
        Method::Ping,
        Method::ListTools,
        Method::CallTool,
        Method::ListResources,
        Method::ReadResource,
    ];

    /// The wire name of this method.
    pub fn name(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::Ping => "ping",
            Method::ListTools => "tools/list",
            Method::CallTool => "tools/call",
            Method::ListResources => "resources/list",
            Method::ReadResource => "resources/read",
        }
    }

    /// Parses a wire name.
    ///
    /// ```
    /// use weather_server::mcp::Method;
    ///
    /// assert_eq!(Method::from_name("tools/call"), Some(Method::CallTool));
    /// assert_eq!(Method::from_name("tools/destroy"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Routes a request to its handler.
pub fn dispatch(registry: &Registry, request: Request) -> Response<serde_json::Value> {
    let Some(method) = Method::from_name(&request.method) else {
        logwise::warn_sync!("unknown method {method}", method = LogIt(&request.method));
        return Response::err(Error::unknown_method(&request.method), request.id);
    };
    match method {
        Method::Initialize => initialize(registry, request).erase(),
        Method::Ping => Response::new(serde_json::json!({}), request.id),
        Method::ListTools => tools::list(registry, request).erase(),
        Method::CallTool => tools::call(registry, request).erase(),
        Method::ListResources => resources::list(registry, request).erase(),
        Method::ReadResource => resources::read(registry, request).erase(),
    }
}

/// Handles a notification. Notifications are never answered.
pub fn notify(notification: &Notification) {
    match notification.method.as_str() {
        "notifications/initialized" => { logwise::info_sync!("client initialized"); }
        "notifications/cancelled" => {
            // Requests run to completion before the next frame is read, so
            // there is never anything in flight to cancel.
            logwise::info_sync!("ignoring cancellation");
        }
        other => logwise::warn_sync!("ignoring notification {method}", method = LogIt(&other)),
    }
}

fn initialize(registry: &Registry, request: Request) -> Response<InitializeResult> {
    let requested = request
        .params
        .as_ref()
        .and_then(|params| params.get("protocolVersion"))
        .and_then(serde_json::Value::as_str);
    Response::new(
        InitializeResult::new(registry.info().clone(), requested),
        request.id,
    )
}

#[derive(Debug, serde::Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    capabilities: HashMap<String, HashMap<String, serde_json::Value>>,
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
}

impl InitializeResult {
    fn new(server_info: ServerInfo, requested: Option<&str>) -> Self {
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
            .to_string();

        let mut capabilities = HashMap::new();
        capabilities.insert("tools".to_string(), HashMap::new());
        capabilities.insert("resources".to_string(), HashMap::new());
        InitializeResult {
            protocol_version,
            capabilities,
            server_info,
        }
    }
}
