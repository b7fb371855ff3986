/* 📖 # How is the engine organised?

Leaf-first, following the data flow of a run:

- descriptor, doc_block, metadata: the inputs (routes, handler docs, provider traits)
- registry: a JSON-backed implementation of both providers
- selection, extractor: which routes are documented, and what is known about them
- summary: the extracted RouteSummary and its stable id
- render, merge: markdown fragments and the edit-preserving merge
- collection: the Postman export
- publisher, config, pipeline: file layout, configuration and the full run
*/

pub mod collection;
pub mod config;
pub mod descriptor;
pub mod doc_block;
pub mod extractor;
pub mod merge;
pub mod metadata;
pub mod pipeline;
pub mod publisher;
pub mod registry;
pub mod render;
pub mod selection;
pub mod summary;

pub use collection::PostmanCollection;
pub use config::{CONFIG_FILE, Config, load_config};
pub use descriptor::{EndpointDescriptor, HandlerRef};
pub use doc_block::{DocBlock, DocTag};
pub use extractor::{
    ExtractionError, ExtractionOptions, ExtractionResult, Extractor, FailureKind, SkipReason,
    SkippedRoute, extract_routes,
};
pub use merge::{MergeOutcome, Preamble, PreservedEdit, merge};
pub use metadata::{
    ClassKind, ClassType, DeclaredType, FieldRules, HandlerMetadata, MetadataProvider,
    MethodParameter, RawRule, ValidationRuleProvider,
};
pub use pipeline::{GenerationReport, generate, generate_from};
pub use publisher::{PublishReport, PublishSettings, Publisher};
pub use registry::StaticRegistry;
pub use render::{RenderedRoute, Renderer};
pub use selection::RouteSelection;
pub use summary::{ParameterSpec, RouteId, RouteSummary, UNCLASSIFIED};
