//! Resource descriptors and the `resources/*` methods.
//!
//! A resource is a document addressed by uri. Unlike tools, resources take no
//! arguments: reading one returns its current text.

use crate::jrpc::{Error, Request, Response};
use crate::registry::Registry;
use logwise::privacy::LogIt;
use std::panic::AssertUnwindSafe;

/// Trait for implementing MCP resources.
pub trait Resource: Send + Sync {
    /// The unique uri clients read this resource by.
    fn uri(&self) -> &str;

    /// Short display name.
    fn name(&self) -> &str;

    /// Longer human-readable description.
    fn description(&self) -> &str;

    /// Media type of the text returned by [`Resource::read`].
    fn mime_type(&self) -> &str;

    /// Produces the resource's current contents.
    fn read(&self) -> Result<String, ResourceReadError>;
}

/// A failure reported by a resource implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ResourceReadError {
    message: String,
}

impl ResourceReadError {
    pub fn new(message: impl Into<String>) -> Self {
        ResourceReadError {
            message: message.into(),
        }
    }
}

/// Result of `resources/list`.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ResourceList {
    pub resources: Vec<ResourceInfo>,
}

/// Metadata about a resource.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ResourceInfo {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub name: String,
    pub description: String,
}

impl ResourceInfo {
    pub(crate) fn from_resource(resource: &dyn Resource) -> Self {
        ResourceInfo {
            uri: resource.uri().to_string(),
            mime_type: resource.mime_type().to_string(),
            name: resource.name().to_string(),
            description: resource.description().to_string(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ReadResourceParams {
    uri: String,
}

/// Result of `resources/read`.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContents>,
}

/// The text of one resource.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// Processes a `resources/list` request.
pub(crate) fn list(registry: &Registry, request: Request) -> Response<ResourceList> {
    let resources = registry
        .resources()
        .map(|resource| ResourceInfo::from_resource(resource))
        .collect();
    Response::new(ResourceList { resources }, request.id)
}

/// Processes a `resources/read` request.
///
/// A resource that fails or panics while reading produces an internal error
/// for this request only.
pub(crate) fn read(registry: &Registry, request: Request) -> Response<ReadResourceResult> {
    let params = match request.params.map(serde_json::from_value::<ReadResourceParams>) {
        Some(Ok(params)) => params,
        Some(Err(err)) => return Response::err(Error::invalid_params(err.to_string()), request.id),
        None => {
            return Response::err(
                Error::invalid_params("No parameters provided".to_string()),
                request.id,
            );
        }
    };
    let resource = match registry.resource(&params.uri) {
        Ok(resource) => resource,
        Err(e) => {
            logwise::warn_sync!("resources/read: {error}", error = LogIt(&e));
            return Response::err(Error::unknown_resource(&params.uri), request.id);
        }
    };
    let text = match std::panic::catch_unwind(AssertUnwindSafe(|| resource.read())) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            logwise::error_sync!(
                "resources/read {uri} failed: {error}",
                uri = LogIt(&params.uri),
                error = LogIt(&e)
            );
            return Response::err(Error::from_error(e), request.id);
        }
        Err(_) => {
            logwise::error_sync!("resources/read {uri} panicked", uri = LogIt(&params.uri));
            return Response::err(
                Error::internal_error(format!("Resource '{}' panicked", params.uri)),
                request.id,
            );
        }
    };
    Response::new(
        ReadResourceResult {
            contents: vec![ResourceContents {
                mime_type: resource.mime_type().to_string(),
                uri: params.uri,
                text,
            }],
        },
        request.id,
    )
}
