/* 📖 # Why is EndpointDescriptor a plain data object?

Enumerating the routing table is somebody else's job. Whatever does it hands the engine
one EndpointDescriptor per registered route, and from then on everything the extractor
needs is either on the descriptor or behind the MetadataProvider trait. Keeping the
descriptor free of logic means a route registry can be serialized (see StaticRegistry)
and replayed in tests without any framework present.
*/

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to the class-method pair that handles a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerRef {
    /// Fully qualified class name, e.g. `App\Http\Controllers\UserController`.
    pub class: String,
    /// Method name on that class.
    pub method: String,
}

impl HandlerRef {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.class, self.method)
    }
}

/// Normalized view of one registered route.
///
/// A descriptor whose `handler` is `None` is backed by a closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    uri: String,
    methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handler: Option<HandlerRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    constraints: BTreeMap<String, String>,
}

impl EndpointDescriptor {
    /// Route handled by a class method.
    pub fn new<M, S>(uri: impl Into<String>, methods: M, handler: HandlerRef) -> Self
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            uri: uri.into(),
            methods: methods.into_iter().map(Into::into).collect(),
            handler: Some(handler),
            constraints: BTreeMap::new(),
        }
    }

    /// Route handled by a closure.
    pub fn closure<M, S>(uri: impl Into<String>, methods: M) -> Self
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            uri: uri.into(),
            methods: methods.into_iter().map(Into::into).collect(),
            handler: None,
            constraints: BTreeMap::new(),
        }
    }

    /// Sets the route name used by name-based selection.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a regex constraint for a placeholder.
    pub fn with_constraint(
        mut self,
        placeholder: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        self.constraints.insert(placeholder.into(), pattern.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// HTTP methods in registration order.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    pub fn is_closure_handler(&self) -> bool {
        self.handler.is_none()
    }

    /// Regex constraint registered for a placeholder, if any.
    pub fn constraint(&self, placeholder: &str) -> Option<&str> {
        self.constraints.get(placeholder).map(String::as_str)
    }

    /// Human-readable label used in log lines, e.g. `[GET,HEAD] api/users/{id}`.
    pub fn label(&self) -> String {
        route_label(&self.methods, &self.uri)
    }
}

/// Formats methods and URI the way warnings and log lines name a route.
pub fn route_label(methods: &[String], uri: &str) -> String {
    format!("[{}] {}", methods.join(","), uri)
}
