use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::descriptor::route_label;

/// Group name used when neither the handler method nor its class names a resource.
pub const UNCLASSIFIED: &str = "Unclassified";

/* 📖 # Why is the route id a hash of uri and methods?

The id anchors a route's region in the published document across runs. It must not depend
on anything a human might reasonably change (title, description, group), otherwise an
edited route would look like a new one. Hashing `uri:METHODS` keeps it stable and opaque.
Methods are hashed in the order the registry supplied them; the same route registered as
`HEAD,GET` instead of `GET,HEAD` is a different section.
*/

/// Stable anchor of a route in the published document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(String);

impl RouteId {
    /// Lowercase hex of the first 16 bytes of SHA-256 over `uri:` followed by the
    /// concatenated methods.
    pub fn compute(uri: &str, methods: &[String]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(uri.as_bytes());
        hasher.update(b":");
        for method in methods {
            hasher.update(method.as_bytes());
        }
        let digest = hasher.finalize();
        RouteId(hex::encode(&digest[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Marker opening this route's region.
    pub fn start_marker(&self) -> String {
        format!("<!-- START_{} -->", self.0)
    }

    /// Marker closing this route's region.
    pub fn end_marker(&self) -> String {
        format!("<!-- END_{} -->", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Documentation of one path or query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub rules: Vec<String>,
    pub description: String,
}

impl ParameterSpec {
    /// Parameter with no type, default or description.
    pub fn untyped(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            required,
            default: None,
            rules: Vec::new(),
            description: String::new(),
        }
    }
}

/// Extracted metadata of one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: RouteId,
    pub resource_group: String,
    pub uri: String,
    pub methods: Vec<String>,
    pub title: String,
    pub description: String,
    pub path_parameters: Vec<ParameterSpec>,
    pub query_parameters: Vec<ParameterSpec>,
    /// Example response bodies as literal text from the handler docs, never parsed.
    pub responses: Vec<String>,
}

impl RouteSummary {
    /// First declared method, used for example requests.
    pub fn primary_method(&self) -> &str {
        self.methods.first().map(String::as_str).unwrap_or("GET")
    }

    /// Path parameters followed by query parameters.
    pub fn all_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.path_parameters.iter().chain(&self.query_parameters)
    }

    /// `[METHODS] uri`, as used in warnings.
    pub fn label(&self) -> String {
        route_label(&self.methods, &self.uri)
    }
}

/// Groups routes by resource group: groups in byte-wise (case-sensitive) order,
/// routes within a group in their original order.
pub fn group_routes(routes: &[RouteSummary]) -> Vec<(&str, Vec<&RouteSummary>)> {
    group_by(routes, |route| route.resource_group.as_str())
}

/// Same ordering as [`group_routes`] for anything that carries a group name.
pub fn group_by<'a, T>(
    items: &'a [T],
    group_of: impl Fn(&'a T) -> &'a str,
) -> Vec<(&'a str, Vec<&'a T>)> {
    let mut groups: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups.entry(group_of(item)).or_default().push(item);
    }
    groups.into_iter().collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn summary(group: &str, uri: &str, methods: &[&str]) -> RouteSummary {
        let methods: Vec<String> = methods.iter().map(|m| m.to_string()).collect();
        RouteSummary {
            id: RouteId::compute(uri, &methods),
            resource_group: group.to_string(),
            uri: uri.to_string(),
            methods,
            title: String::new(),
            description: String::new(),
            path_parameters: Vec::new(),
            query_parameters: Vec::new(),
            responses: Vec::new(),
        }
    }

    fn methods(list: &[&str]) -> Vec<String> {
        list.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_route_id_known_value() {
        let id = RouteId::compute("api/users/{id}", &methods(&["GET", "HEAD"]));
        assert_eq!(id.as_str(), "ca853aae74e0f5ee754f8fa1c94d7f80");
    }

    #[test]
    fn test_route_id_is_deterministic() {
        let first = RouteId::compute("api/users", &methods(&["GET"]));
        let second = RouteId::compute("api/users", &methods(&["GET"]));
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "624079c20142314239cc5d60026a22c2");
    }

    #[test]
    fn test_route_id_depends_on_method_order() {
        let get_head = RouteId::compute("api/users/{id}", &methods(&["GET", "HEAD"]));
        let head_get = RouteId::compute("api/users/{id}", &methods(&["HEAD", "GET"]));
        assert_ne!(get_head, head_get);
        assert_eq!(head_get.as_str(), "341e765eae6745a6d64671f49e89d273");
    }

    #[test]
    fn test_markers() {
        let id = RouteId::compute("api/users", &methods(&["GET"]));
        assert_eq!(id.start_marker(), "<!-- START_624079c20142314239cc5d60026a22c2 -->");
        assert_eq!(id.end_marker(), "<!-- END_624079c20142314239cc5d60026a22c2 -->");
    }

    #[test]
    fn test_group_routes_sorts_case_sensitively() {
        let routes = vec![
            summary("users", "api/a", &["GET"]),
            summary("Orders", "api/b", &["GET"]),
            summary("Users", "api/c", &["GET"]),
            summary("Orders", "api/d", &["POST"]),
        ];
        let groups = group_routes(&routes);
        let names: Vec<_> = groups.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Orders", "Users", "users"]);

        let orders: Vec<_> = groups[0].1.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(orders, vec!["api/b", "api/d"]);
    }

    #[test]
    fn test_summary_serializes_type_field() {
        let mut route = summary(UNCLASSIFIED, "api/users/{id}", &["GET"]);
        route.path_parameters.push(ParameterSpec::untyped("id", true));
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["path_parameters"][0]["type"], serde_json::Value::Null);
        assert_eq!(json["resource_group"], "Unclassified");
    }
}
