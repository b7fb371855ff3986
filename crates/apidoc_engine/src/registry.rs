/* 📖 # What is the static registry?

The engine never enumerates routes itself. A StaticRegistry is the hand-over format: a JSON
document listing the routes, the handler classes (doc comments and method signatures) and
the validated request types with their rule descriptors. It implements both provider traits,
so extraction from a registry file runs the same code as any live integration.

```json
{
  "routes": [
    {"name": "users.show", "uri": "api/users/{id}", "methods": ["GET", "HEAD"],
     "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "show"}}
  ],
  "classes": {
    "App\\Http\\Controllers\\UserController": {
      "doc": "/** @resource Users */",
      "methods": {
        "show": {"doc": "/** Show a user. */",
                 "parameters": [{"name": "id", "type": {"class": "App\\User", "kind": "model"}}]}
      }
    }
  },
  "requests": {
    "App\\Http\\Requests\\StoreUser": {"rules": {"name": "required|max:255"}}
  }
}
```
*/

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use apidoc_base::{ApidocResult, FilePath, PalHandle, ResultExt, err};

use crate::descriptor::{EndpointDescriptor, HandlerRef};
use crate::doc_block::DocBlock;
use crate::metadata::{
    FieldRules, HandlerMetadata, MetadataProvider, MethodParameter, RawRule,
    ValidationRuleProvider,
};

#[derive(Debug, Clone, Default, Deserialize)]
struct ClassEntry {
    #[serde(default)]
    doc: String,
    #[serde(default)]
    methods: HashMap<String, MethodEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MethodEntry {
    #[serde(default)]
    doc: String,
    #[serde(default)]
    parameters: Vec<MethodParameter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RequestEntry {
    #[serde(default)]
    validator: Option<Map<String, Value>>,
    #[serde(default)]
    rules: Map<String, Value>,
}

/// Route registry handed over as data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticRegistry {
    #[serde(default)]
    routes: Vec<EndpointDescriptor>,
    #[serde(default)]
    classes: HashMap<String, ClassEntry>,
    #[serde(default)]
    requests: HashMap<String, RequestEntry>,
}

impl StaticRegistry {
    pub fn from_json_str(json: &str) -> ApidocResult<Self> {
        serde_json::from_str(json).map_err(|e| err!("Failed to parse route registry: {}", e))
    }

    /// Loads a registry file through the PAL.
    #[instrument(skip(pal), fields(path = %path))]
    pub fn load(pal: &PalHandle, path: &FilePath) -> ApidocResult<Self> {
        let json = pal
            .read_file_to_string(path)
            .with_context(|| format!("Failed to read route registry {}", path))?;
        let registry = Self::from_json_str(&json)?;
        debug!(
            routes = registry.routes.len(),
            classes = registry.classes.len(),
            "route registry loaded"
        );
        Ok(registry)
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[EndpointDescriptor] {
        &self.routes
    }

    /// Appends a route after the ones already registered.
    pub fn add_route(&mut self, descriptor: EndpointDescriptor) {
        self.routes.push(descriptor);
    }

    /// Registers a class doc comment.
    pub fn add_class(&mut self, class: impl Into<String>, doc: impl Into<String>) {
        self.classes.entry(class.into()).or_default().doc = doc.into();
    }

    /// Registers a handler method with its doc comment and parameters.
    pub fn add_method(
        &mut self,
        handler: &HandlerRef,
        doc: impl Into<String>,
        parameters: Vec<MethodParameter>,
    ) {
        self.classes
            .entry(handler.class.clone())
            .or_default()
            .methods
            .insert(
                handler.method.clone(),
                MethodEntry {
                    doc: doc.into(),
                    parameters,
                },
            );
    }

    /// Registers a request type's `rules` descriptor from a JSON object.
    pub fn add_request_rules(&mut self, request_type: impl Into<String>, rules: Value) {
        let entry = self.requests.entry(request_type.into()).or_default();
        if let Value::Object(rules) = rules {
            entry.rules = rules;
        }
    }

    /// Registers a request type's validator factory descriptor from a JSON object.
    pub fn add_validator_rules(&mut self, request_type: impl Into<String>, rules: Value) {
        let entry = self.requests.entry(request_type.into()).or_default();
        if let Value::Object(rules) = rules {
            entry.validator = Some(rules);
        }
    }

    fn request(&self, request_type: &str) -> ApidocResult<&RequestEntry> {
        self.requests
            .get(request_type)
            .ok_or_else(|| err!("Request type `{}` is not registered", request_type))
    }
}

impl MetadataProvider for StaticRegistry {
    fn handler_metadata(&self, handler: &HandlerRef) -> ApidocResult<HandlerMetadata> {
        let class = self
            .classes
            .get(&handler.class)
            .ok_or_else(|| err!("Handler class `{}` is not registered", handler.class))?;
        let method = class.methods.get(&handler.method).ok_or_else(|| {
            err!(
                "Method `{}` does not exist on `{}`",
                handler.method,
                handler.class
            )
        })?;

        Ok(HandlerMetadata {
            parameters: method.parameters.clone(),
            method_doc: DocBlock::parse(&method.doc),
            class_doc: DocBlock::parse(&class.doc),
        })
    }
}

impl ValidationRuleProvider for StaticRegistry {
    fn validator_factory_rules(&self, request_type: &str) -> ApidocResult<Option<Vec<FieldRules>>> {
        self.request(request_type)?
            .validator
            .as_ref()
            .map(field_rules)
            .transpose()
    }

    fn rules(&self, request_type: &str) -> ApidocResult<Vec<FieldRules>> {
        field_rules(&self.request(request_type)?.rules)
    }
}

fn field_rules(rules: &Map<String, Value>) -> ApidocResult<Vec<FieldRules>> {
    rules
        .iter()
        .map(|(field, value)| {
            raw_rule(value)
                .map(|rule| FieldRules::new(field.clone(), rule))
                .with_context(|| format!("Malformed validation rule for field `{}`", field))
        })
        .collect()
}

/// Strings are pipe-delimited rule lists, arrays are rule lists, anything else is a rule
/// object and is kept as its JSON text.
fn raw_rule(value: &Value) -> ApidocResult<RawRule> {
    match value {
        Value::Null => Err(err!("rule is null")),
        Value::String(rules) => Ok(RawRule::Piped(rules.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(rule) => Ok(RawRule::Piped(rule.clone())),
                other => raw_rule(other),
            })
            .collect::<ApidocResult<Vec<_>>>()
            .map(RawRule::List),
        Value::Number(_) | Value::Bool(_) | Value::Object(_) => {
            Ok(RawRule::Custom(value.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractionOptions, Extractor, extract_routes};
    use crate::selection::RouteSelection;
    use apidoc_base::MockPal;
    use serde_json::json;

    const REGISTRY: &str = r#"{
        "routes": [
            {"name": "users.store", "uri": "api/users", "methods": ["POST"],
             "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "store"}},
            {"uri": "api/ping", "methods": ["GET"]}
        ],
        "classes": {
            "App\\Http\\Controllers\\UserController": {
                "doc": "/** @resource Users */",
                "methods": {
                    "store": {
                        "doc": "/** Create a user. */",
                        "parameters": [
                            {"name": "request",
                             "type": {"class": "App\\Http\\Requests\\StoreUser",
                                      "kind": "validation_request"}}
                        ]
                    }
                }
            }
        },
        "requests": {
            "App\\Http\\Requests\\StoreUser": {
                "rules": {
                    "name": "required|max:255",
                    "email": ["required", "email"],
                    "role": {"in": ["admin", "user"]}
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_registry() {
        let registry = StaticRegistry::from_json_str(REGISTRY).unwrap();
        assert_eq!(registry.routes().len(), 2);
        assert!(registry.routes()[1].is_closure_handler());

        let handler = registry.routes()[0].handler().unwrap().clone();
        let metadata = registry.handler_metadata(&handler).unwrap();
        assert_eq!(metadata.method_doc.short_description(), "Create a user.");
        assert_eq!(
            metadata.class_doc.tag("resource").map(|t| t.content()),
            Some("Users")
        );
        assert_eq!(metadata.parameters.len(), 1);
    }

    #[test]
    fn test_rules_keep_declaration_order() {
        let registry = StaticRegistry::from_json_str(REGISTRY).unwrap();
        let rules = registry.effective_rules("App\\Http\\Requests\\StoreUser").unwrap();
        let fields: Vec<_> = rules.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "role"]);
        assert_eq!(rules[1].rule.normalize(), vec!["required", "email"]);
        assert_eq!(rules[2].rule.normalize(), vec![r#"{"in":["admin","user"]}"#]);
    }

    #[test]
    fn test_validator_factory_overrides_rules() {
        let mut registry = StaticRegistry::default();
        registry.add_request_rules("Search", json!({"q": "string"}));
        registry.add_validator_rules("Search", json!({"term": "required"}));

        let rules = registry.effective_rules("Search").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].field, "term");
    }

    #[test]
    fn test_null_rule_is_malformed() {
        let mut registry = StaticRegistry::default();
        registry.add_request_rules("Broken", json!({"name": null}));
        let err = registry.rules("Broken").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed validation rule for field `name`: rule is null"
        );
    }

    #[test]
    fn test_unknown_handler_is_an_error() {
        let registry = StaticRegistry::default();
        let err = registry
            .handler_metadata(&HandlerRef::new("Missing", "index"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Handler class `Missing` is not registered");
    }

    #[test]
    fn test_routes_added_in_code_are_extracted_in_order() {
        let controller = "App\\Http\\Controllers\\OrderController";
        let mut registry = StaticRegistry::default();
        registry.add_class(controller, "/** @resource Orders */");
        registry.add_method(&HandlerRef::new(controller, "index"), "/** List orders. */", vec![]);
        registry.add_method(
            &HandlerRef::new(controller, "store"),
            "/** Place an order. */",
            vec![],
        );
        registry.add_route(
            EndpointDescriptor::new("api/orders", ["POST"], HandlerRef::new(controller, "store"))
                .with_name("orders.store"),
        );
        registry.add_route(EndpointDescriptor::new(
            "api/orders",
            ["GET"],
            HandlerRef::new(controller, "index"),
        ));

        let labels: Vec<_> = registry.routes().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["[POST] api/orders", "[GET] api/orders"]);

        let extractor = Extractor::new(&registry, &registry, ExtractionOptions::default());
        let selection = RouteSelection::new(Vec::<String>::new(), Some("api/*")).unwrap();
        let result = extract_routes(&extractor, registry.routes(), &selection);
        assert!(result.errors.is_empty());
        let titles: Vec<_> = result.routes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Place an order.", "List orders."]);
        assert!(result.routes.iter().all(|r| r.resource_group == "Orders"));
    }

    #[test]
    fn test_load_through_pal() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("routes.json"), REGISTRY.as_bytes().to_vec());
        let pal = PalHandle::new(mock);

        let registry = StaticRegistry::load(&pal, &FilePath::from("routes.json")).unwrap();
        assert_eq!(registry.routes()[0].name(), Some("users.store"));

        let missing = StaticRegistry::load(&pal, &FilePath::from("nope.json"));
        assert!(missing.is_err());
    }
}
