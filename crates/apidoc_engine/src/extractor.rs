/* 📖 # Why is extraction fail-tolerant?

A registry of a few hundred routes almost always has a handful that cannot be documented:
closures, handlers with an untyped path argument, a request type whose rule descriptor is
broken. Each of those failures is caught per route, classified, logged and collected in
the ExtractionResult, and the batch carries on. Only the caller decides whether a run with
failures is acceptable.
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, info, instrument, warn};

use apidoc_base::{ApidocError, ApidocResult, ErrorKind, ResultExt, err};

use crate::descriptor::EndpointDescriptor;
use crate::metadata::{
    ClassKind, DeclaredType, HandlerMetadata, MetadataProvider, ValidationRuleProvider,
};
use crate::selection::RouteSelection;
use crate::summary::{ParameterSpec, RouteId, RouteSummary, UNCLASSIFIED};

pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(.*?)\}").expect("placeholder pattern is valid"));

/// Doc tag naming the resource group.
pub const RESOURCE_TAG: &str = "resource";
/// Doc tag carrying an example response.
pub const RESPONSE_TAG: &str = "response";
/// Doc tag hiding a handler (or a whole class) from the documentation.
pub const HIDE_TAG: &str = "docsHide";

/// Options controlling extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionOptions {
    /// Accept handler parameters without a declared type instead of failing the route.
    pub skip_type_checks: bool,
}

/// Failure categories for a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The handler is a closure.
    UnsupportedHandler,
    /// A path parameter matched an untyped handler argument in strict mode.
    MissingType,
    /// Anything else that went wrong while extracting.
    ExtractionFailure,
}

impl FailureKind {
    pub fn of(error: &ApidocError) -> Self {
        match error.kind() {
            ErrorKind::UnsupportedHandler { .. } => FailureKind::UnsupportedHandler,
            ErrorKind::MissingType { .. } => FailureKind::MissingType,
            _ => FailureKind::ExtractionFailure,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::UnsupportedHandler => "unsupported handler",
            FailureKind::MissingType => "missing type",
            FailureKind::ExtractionFailure => "extraction failure",
        };
        write!(f, "{}", name)
    }
}

/// A route that could not be extracted.
#[derive(Debug)]
pub struct ExtractionError {
    /// `[METHODS] uri` of the failed route.
    pub route: String,
    pub kind: FailureKind,
    pub error: Box<ApidocError>,
}

/// Why a route was left out without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSelected,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoute {
    pub route: String,
    pub reason: SkipReason,
}

/// Outcome of extracting a batch of routes.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    /// Successfully extracted routes, in registry order, one per id.
    pub routes: Vec<RouteSummary>,
    pub errors: Vec<ExtractionError>,
    pub skipped: Vec<SkippedRoute>,
}

/// Turns endpoint descriptors into route summaries.
pub struct Extractor<'a> {
    metadata: &'a dyn MetadataProvider,
    rules: &'a dyn ValidationRuleProvider,
    options: ExtractionOptions,
}

impl<'a> Extractor<'a> {
    pub fn new(
        metadata: &'a dyn MetadataProvider,
        rules: &'a dyn ValidationRuleProvider,
        options: ExtractionOptions,
    ) -> Self {
        Self {
            metadata,
            rules,
            options,
        }
    }

    fn handler_metadata(&self, descriptor: &EndpointDescriptor) -> ApidocResult<HandlerMetadata> {
        let handler = descriptor.handler().ok_or_else(|| {
            Box::new(ApidocError::new(ErrorKind::UnsupportedHandler {
                handler: "Closure".to_string(),
            }))
        })?;
        self.metadata.handler_metadata(handler)
    }

    /// True if the handler method or its class carries the hide marker.
    pub fn is_hidden(&self, descriptor: &EndpointDescriptor) -> ApidocResult<bool> {
        let metadata = self.handler_metadata(descriptor)?;
        Ok(metadata.doc_blocks().iter().any(|doc| doc.has_tag(HIDE_TAG)))
    }

    /// Extracts the summary of one route.
    #[instrument(skip(self, descriptor), fields(route = %descriptor.label()))]
    pub fn extract(&self, descriptor: &EndpointDescriptor) -> ApidocResult<RouteSummary> {
        let metadata = self.handler_metadata(descriptor)?;
        if descriptor.methods().is_empty() {
            return Err(err!("Route {} declares no HTTP methods", descriptor.uri()));
        }

        let resource_group = metadata
            .doc_blocks()
            .iter()
            .find_map(|doc| {
                doc.tag(RESOURCE_TAG)
                    .map(|tag| tag.content().trim())
                    .filter(|content| !content.is_empty())
            })
            .unwrap_or(UNCLASSIFIED)
            .to_string();

        let responses = metadata
            .method_doc
            .tags(RESPONSE_TAG)
            .map(|tag| tag.content().to_string())
            .collect();

        let path_parameters = self.path_parameters(descriptor, &metadata)?;
        let query_parameters = self.query_parameters(&metadata)?;

        Ok(RouteSummary {
            id: RouteId::compute(descriptor.uri(), descriptor.methods()),
            resource_group,
            uri: descriptor.uri().to_string(),
            methods: descriptor.methods().to_vec(),
            title: metadata.method_doc.short_description().to_string(),
            description: metadata.method_doc.long_description().to_string(),
            path_parameters,
            query_parameters,
            responses,
        })
    }

    fn path_parameters(
        &self,
        descriptor: &EndpointDescriptor,
        metadata: &HandlerMetadata,
    ) -> ApidocResult<Vec<ParameterSpec>> {
        PLACEHOLDER
            .captures_iter(descriptor.uri())
            .map(|caps| {
                let placeholder = &caps[1];
                let name = placeholder.trim_matches('?');
                let required = name == placeholder;
                let mut parameter = ParameterSpec::untyped(name, required);

                let argument = metadata
                    .parameters
                    .iter()
                    .find(|param| param.name.eq_ignore_ascii_case(name));
                if let Some(argument) = argument {
                    match &argument.declared_type {
                        Some(DeclaredType::Primitive(primitive)) => {
                            parameter.param_type = Some(primitive.clone());
                        }
                        Some(DeclaredType::Class(class)) if class.kind == ClassKind::Model => {
                            parameter.param_type = Some("model_id".to_string());
                            parameter.description = format!("{} id", class.short_name());
                        }
                        Some(DeclaredType::Class(class)) => {
                            parameter.param_type = Some(class.short_name().to_string());
                        }
                        None if !self.options.skip_type_checks => {
                            return Err(Box::new(ApidocError::new(ErrorKind::MissingType {
                                parameter: name.to_string(),
                            })));
                        }
                        None => {}
                    }
                    if argument.optional {
                        parameter.default = argument.default.clone();
                    }
                }

                if required {
                    parameter.rules.push("required".to_string());
                }
                if let Some(pattern) = descriptor.constraint(name) {
                    parameter.rules.push(format!("regex:{}", pattern));
                }
                Ok(parameter)
            })
            .collect()
    }

    fn query_parameters(&self, metadata: &HandlerMetadata) -> ApidocResult<Vec<ParameterSpec>> {
        let Some(request) = metadata
            .parameters
            .iter()
            .find_map(|param| param.class_of_kind(ClassKind::ValidationRequest))
        else {
            return Ok(Vec::new());
        };

        let rules = self
            .rules
            .effective_rules(&request.class)
            .with_context(|| format!("Failed to read validation rules of `{}`", request.class))?;

        Ok(rules
            .iter()
            .map(|field| {
                let mut parameter = ParameterSpec::untyped(field.field.clone(), false);
                parameter.rules = field.rule.normalize();
                parameter
            })
            .collect())
    }
}

/// Extracts every selected, visible route.
///
/// Failures are collected per route. When two routes share an id (same uri and methods)
/// the later one replaces the earlier in place.
#[instrument(skip_all, fields(route_count = descriptors.len()))]
pub fn extract_routes(
    extractor: &Extractor<'_>,
    descriptors: &[EndpointDescriptor],
    selection: &RouteSelection,
) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    let mut positions: HashMap<RouteId, usize> = HashMap::new();

    for descriptor in descriptors {
        let route = descriptor.label();
        debug!(%route, "processing route");

        if !selection.matches(descriptor) {
            debug!(%route, "skipping route: not selected");
            result.skipped.push(SkippedRoute {
                route,
                reason: SkipReason::NotSelected,
            });
            continue;
        }

        let outcome = extractor.is_hidden(descriptor).and_then(|hidden| {
            if hidden {
                Ok(None)
            } else {
                extractor.extract(descriptor).map(Some)
            }
        });

        match outcome {
            Ok(Some(summary)) => {
                info!(%route, "processed route");
                match positions.get(&summary.id) {
                    Some(&index) => {
                        warn!(
                            %route,
                            id = %summary.id,
                            "route id collides with an earlier route, keeping the later one"
                        );
                        result.routes[index] = summary;
                    }
                    None => {
                        positions.insert(summary.id.clone(), result.routes.len());
                        result.routes.push(summary);
                    }
                }
            }
            Ok(None) => {
                debug!(%route, "skipping route: hidden from docs");
                result.skipped.push(SkippedRoute {
                    route,
                    reason: SkipReason::Hidden,
                });
            }
            Err(error) => {
                let kind = FailureKind::of(&error);
                match kind {
                    FailureKind::UnsupportedHandler | FailureKind::MissingType => {
                        warn!(%route, %kind, "skipping route: {}", error);
                    }
                    FailureKind::ExtractionFailure => {
                        error!(%route, %kind, "failed to process route: {}", error);
                    }
                }
                result.errors.push(ExtractionError { route, kind, error });
            }
        }
    }

    info!(
        extracted = result.routes.len(),
        failed = result.errors.len(),
        skipped = result.skipped.len(),
        "route extraction finished"
    );
    result
}
