//! The capability registry: every tool and resource the server exposes.
//!
//! A [`Registry`] is assembled once at startup through [`RegistryBuilder`] and
//! never changes afterwards. The dispatcher borrows it for each request, so
//! there is no global state and no locking.
//!
//! ```
//! use weather_server::registry::{Registry, ServerInfo};
//!
//! let registry = Registry::builder(ServerInfo::default()).build().unwrap();
//! assert_eq!(registry.tools().count(), 0);
//! assert!(registry.tool("get_weather").is_err());
//! ```

use crate::mcp::resources::Resource;
use crate::mcp::tools::Tool;

/// Name and version reported to clients during `initialize`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServerInfo {
    /// Program name shown to the client.
    pub name: String,
    /// Program version, conventionally semver.
    pub version: String,
}

impl ServerInfo {
    /// Creates server info from a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ServerInfo {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        ServerInfo::new("weather-server", env!("CARGO_PKG_VERSION"))
    }
}

/// A failed lookup by name or uri.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

/// The registry could not be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool {0:?} is registered more than once")]
    DuplicateTool(String),
    #[error("resource {0:?} is registered more than once")]
    DuplicateResource(String),
}

/// Immutable table of tools and resources.
pub struct Registry {
    info: ServerInfo,
    tools: Vec<Box<dyn Tool>>,
    resources: Vec<Box<dyn Resource>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("info", &self.info)
            .field("tools", &self.tools().map(|t| t.name()).collect::<Vec<_>>())
            .field("resources", &self.resources().map(|r| r.uri()).collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Starts an empty registry that will report `info` to clients.
    pub fn builder(info: ServerInfo) -> RegistryBuilder {
        RegistryBuilder {
            info,
            tools: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Identity reported during `initialize`.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Tools in registration order.
    pub fn tools(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|tool| &**tool)
    }

    /// Resources in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &dyn Resource> {
        self.resources.iter().map(|resource| &**resource)
    }

    /// Finds a tool by exact name.
    pub fn tool(&self, name: &str) -> Result<&dyn Tool, LookupError> {
        self.tools()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| LookupError::UnknownTool(name.to_string()))
    }

    /// Finds a resource by exact uri.
    pub fn resource(&self, uri: &str) -> Result<&dyn Resource, LookupError> {
        self.resources()
            .find(|resource| resource.uri() == uri)
            .ok_or_else(|| LookupError::UnknownResource(uri.to_string()))
    }
}

/// Collects tools and resources, then freezes them into a [`Registry`].
pub struct RegistryBuilder {
    info: ServerInfo,
    tools: Vec<Box<dyn Tool>>,
    resources: Vec<Box<dyn Resource>>,
}

impl RegistryBuilder {
    /// Appends a tool. Registering a renamed copy of an existing tool type
    /// (e.g. a versioned name) is just another call.
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Appends a resource.
    pub fn resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources.push(Box::new(resource));
        self
    }

    /// Freezes the table, rejecting duplicate tool names or resource uris.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for (i, tool) in self.tools.iter().enumerate() {
            if self.tools[..i].iter().any(|t| t.name() == tool.name()) {
                return Err(RegistryError::DuplicateTool(tool.name().to_string()));
            }
        }
        for (i, resource) in self.resources.iter().enumerate() {
            if self.resources[..i].iter().any(|r| r.uri() == resource.uri()) {
                return Err(RegistryError::DuplicateResource(resource.uri().to_string()));
            }
        }
        Ok(Registry {
            info: self.info,
            tools: self.tools,
            resources: self.resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::resources::ResourceReadError;
    use crate::mcp::tools::{Arguments, InputSchema, ToolCallError};

    struct Named(&'static str);

    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "test tool"
        }
        fn input_schema(&self) -> InputSchema {
            InputSchema::new(vec![])
        }
        fn call(&self, _: Arguments) -> Result<serde_json::Value, ToolCallError> {
            Ok(self.0.into())
        }
    }

    struct Doc(&'static str);

    impl Resource for Doc {
        fn uri(&self) -> &str {
            self.0
        }
        fn name(&self) -> &str {
            "doc"
        }
        fn description(&self) -> &str {
            "test resource"
        }
        fn mime_type(&self) -> &str {
            "text/plain"
        }
        fn read(&self) -> Result<String, ResourceReadError> {
            Ok(String::new())
        }
    }

    #[test]
    fn lookups_find_registered_entries() {
        let registry = Registry::builder(ServerInfo::default())
            .tool(Named("a"))
            .tool(Named("b"))
            .resource(Doc("test://doc"))
            .build()
            .unwrap();
        assert_eq!(registry.tool("b").unwrap().name(), "b");
        assert_eq!(registry.resource("test://doc").unwrap().name(), "doc");
        let names: Vec<_> = registry.tools().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn unknown_names_are_errors() {
        let registry = Registry::builder(ServerInfo::default()).build().unwrap();
        assert_eq!(
            registry.tool("nope").err(),
            Some(LookupError::UnknownTool("nope".to_string()))
        );
        assert_eq!(
            registry.resource("x://y").err().map(|e| e.to_string()),
            Some("Unknown resource: x://y".to_string())
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Registry::builder(ServerInfo::default())
            .tool(Named("a"))
            .tool(Named("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("a".to_string()));

        let err = Registry::builder(ServerInfo::default())
            .resource(Doc("test://doc"))
            .resource(Doc("test://doc"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateResource("test://doc".to_string()));
    }
}
