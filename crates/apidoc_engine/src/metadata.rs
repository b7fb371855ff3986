/* 📖 # Why does the extractor talk to providers instead of inspecting handlers?

Handler signatures and doc comments only exist at runtime inside whatever framework
registered the routes. The extractor asks a MetadataProvider for a typed description of
a handler (its parameters and its two doc blocks) and asks a ValidationRuleProvider for
the rule descriptor of a request type. Anything that can answer those two questions can
be documented, and tests answer them from a StaticRegistry.
*/

use serde::{Deserialize, Serialize};

use apidoc_base::ApidocResult;

use crate::descriptor::HandlerRef;
use crate::doc_block::DocBlock;

/// What kind of class a parameter is declared as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Data-model type, documented as `model_id` since routes receive its key.
    Model,
    /// A type that is (or derives from) the validated-request type.
    ValidationRequest,
    #[default]
    Other,
}

/// A class-typed parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    /// Fully qualified class name.
    pub class: String,
    #[serde(default)]
    pub kind: ClassKind,
}

impl ClassType {
    pub fn new(class: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            class: class.into(),
            kind,
        }
    }

    /// Class name without its namespace, e.g. `User` for `App\Models\User`.
    pub fn short_name(&self) -> &str {
        self.class
            .rsplit(['\\', ':', '.'])
            .next()
            .unwrap_or(&self.class)
    }
}

/// Declared type of a handler parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredType {
    /// Builtin type tag such as `int` or `string`.
    Primitive(String),
    Class(ClassType),
}

/// One formal parameter of a handler method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub declared_type: Option<DeclaredType>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, declared_type: Option<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            optional: false,
            default: None,
        }
    }

    /// Marks the parameter optional with the given default value.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    /// Class type of the parameter if it is declared as one of `kind`.
    pub fn class_of_kind(&self, kind: ClassKind) -> Option<&ClassType> {
        match &self.declared_type {
            Some(DeclaredType::Class(class)) if class.kind == kind => Some(class),
            _ => None,
        }
    }
}

/// Everything the extractor needs to know about a handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerMetadata {
    pub parameters: Vec<MethodParameter>,
    pub method_doc: DocBlock,
    pub class_doc: DocBlock,
}

impl HandlerMetadata {
    /// Method doc block first, then the class doc block.
    pub fn doc_blocks(&self) -> [&DocBlock; 2] {
        [&self.method_doc, &self.class_doc]
    }
}

/// Supplies handler metadata for route handlers.
pub trait MetadataProvider {
    fn handler_metadata(&self, handler: &HandlerRef) -> ApidocResult<HandlerMetadata>;
}

/// A rule entry of a validation-rule descriptor, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRule {
    /// A single `|`-delimited rule string, e.g. `required|max:255`.
    Piped(String),
    /// A rule object, already stringified.
    Custom(String),
    /// A list of rules.
    List(Vec<RawRule>),
}

impl RawRule {
    /// Normalizes to a flat list of rule strings.
    ///
    /// Only a top-level rule string is split on `|`; strings inside a list are kept whole.
    pub fn normalize(&self) -> Vec<String> {
        match self {
            RawRule::Piped(rules) => rules
                .split('|')
                .filter(|rule| !rule.is_empty())
                .map(str::to_string)
                .collect(),
            RawRule::Custom(rule) => vec![rule.clone()],
            RawRule::List(items) => items
                .iter()
                .flat_map(|item| match item {
                    RawRule::Piped(rule) | RawRule::Custom(rule) => vec![rule.clone()],
                    RawRule::List(_) => item.normalize(),
                })
                .collect(),
        }
    }
}

/// Rules of one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    pub field: String,
    pub rule: RawRule,
}

impl FieldRules {
    pub fn new(field: impl Into<String>, rule: RawRule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

/// Supplies validation-rule descriptors for request types.
pub trait ValidationRuleProvider {
    /// Rules built by the type's custom validator factory, or `None` if it has none.
    fn validator_factory_rules(&self, request_type: &str) -> ApidocResult<Option<Vec<FieldRules>>>;

    /// Rules declared by the type's `rules` method.
    fn rules(&self, request_type: &str) -> ApidocResult<Vec<FieldRules>>;

    /// The validator factory wins over the plain rules when present.
    fn effective_rules(&self, request_type: &str) -> ApidocResult<Vec<FieldRules>> {
        match self.validator_factory_rules(request_type)? {
            Some(rules) => Ok(rules),
            None => self.rules(request_type),
        }
    }
}
