/* 📖 # What does one documentation run do?

1. validate the configuration (no selection criteria is fatal)
2. load the route registry
3. extract every selected, visible route; failures are collected, not raised
4. render, merge with the previous output and write the files

Only configuration, registry and file I/O problems abort the run.
*/

use tracing::{info, instrument};

use apidoc_base::{ApidocResult, PalHandle};

use crate::config::Config;
use crate::descriptor::EndpointDescriptor;
use crate::extractor::{ExtractionResult, Extractor, extract_routes};
use crate::metadata::{MetadataProvider, ValidationRuleProvider};
use crate::publisher::{PublishReport, PublishSettings, Publisher};
use crate::registry::StaticRegistry;

/// Outcome of a full run.
#[derive(Debug)]
pub struct GenerationReport {
    pub extraction: ExtractionResult,
    pub publish: PublishReport,
}

/// Runs the pipeline over the registry named in the configuration.
#[instrument(skip_all, fields(registry = %config.registry))]
pub fn generate(pal: &PalHandle, config: &Config) -> ApidocResult<GenerationReport> {
    config.validate()?;
    let registry = StaticRegistry::load(pal, &config.registry_path())?;
    generate_from(pal, config, registry.routes(), &registry, &registry)
}

/// Runs the pipeline over already enumerated routes and arbitrary providers.
pub fn generate_from(
    pal: &PalHandle,
    config: &Config,
    descriptors: &[EndpointDescriptor],
    metadata: &dyn MetadataProvider,
    rules: &dyn ValidationRuleProvider,
) -> ApidocResult<GenerationReport> {
    let selection = config.selection()?;
    let extractor = Extractor::new(metadata, rules, config.extraction_options());
    let extraction = extract_routes(&extractor, descriptors, &selection);

    let publisher = Publisher::new(pal.clone(), PublishSettings::from(config));
    let publish = publisher.publish(&extraction.routes)?;
    info!(
        documented = publish.routes,
        preserved = publish.preserved.len(),
        failed = extraction.errors.len(),
        "documentation generated"
    );

    Ok(GenerationReport {
        extraction,
        publish,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FailureKind;
    use apidoc_base::{FilePath, MockPal};

    const REGISTRY: &str = r#"{
        "routes": [
            {"name": "users.index", "uri": "api/users", "methods": ["GET", "HEAD"],
             "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "index"}},
            {"name": "users.show", "uri": "api/users/{user}", "methods": ["GET", "HEAD"],
             "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "show"}},
            {"name": "users.store", "uri": "api/users", "methods": ["POST"],
             "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "store"}},
            {"uri": "api/ping", "methods": ["GET"]},
            {"name": "admin", "uri": "admin", "methods": ["GET"],
             "handler": {"class": "App\\Http\\Controllers\\UserController", "method": "index"}}
        ],
        "classes": {
            "App\\Http\\Controllers\\UserController": {
                "doc": "/** @resource Users */",
                "methods": {
                    "index": {"doc": "/**\n * List users.\n *\n * @response [{\"id\": 1}]\n */"},
                    "show": {"doc": "/** Show a user. */",
                             "parameters": [{"name": "user",
                                             "type": {"class": "App\\User", "kind": "model"}}]},
                    "store": {"doc": "/** Create a user. */",
                              "parameters": [{"name": "request",
                                              "type": {"class": "App\\Http\\Requests\\StoreUser",
                                                       "kind": "validation_request"}}]}
                }
            }
        },
        "requests": {
            "App\\Http\\Requests\\StoreUser": {"rules": {"name": "required|max:255"}}
        }
    }"#;

    fn setup(config_toml: &str) -> (MockPal, PalHandle, Config) {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("routes.json"), REGISTRY.as_bytes().to_vec());
        let pal = PalHandle::new(mock.clone());
        (mock, pal, Config::from_toml_str(config_toml).unwrap())
    }

    #[test]
    fn test_generate_end_to_end() {
        let (mock, pal, config) = setup("route_prefix = \"api/*\"");

        let report = generate(&pal, &config).unwrap();

        assert_eq!(report.extraction.routes.len(), 3);
        assert_eq!(report.extraction.errors.len(), 1);
        assert_eq!(report.extraction.errors[0].kind, FailureKind::UnsupportedHandler);
        assert!(report.publish.collection_written);

        let document = mock
            .file_contents(&FilePath::from("public/docs/source/index.md"))
            .unwrap();
        assert!(document.contains("\n#Users\n"));
        assert!(document.contains("## List users."));
        assert!(document.contains("user | model_id | required | User id | required"));
        assert!(document.contains("name |  | optional |  | required, max:255"));
        assert!(!document.contains("api/ping"));
        assert!(!document.contains("`GET admin`"));
    }

    #[test]
    fn test_named_route_is_selected_without_prefix() {
        let (_mock, pal, config) = setup("routes = [\"admin\"]");
        let report = generate(&pal, &config).unwrap();
        let uris: Vec<_> = report.extraction.routes.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["admin"]);
    }

    #[test]
    fn test_missing_selection_aborts_before_reading_registry() {
        let (mock, pal, config) = setup("title = \"Docs\"");
        assert!(generate(&pal, &config).is_err());
        assert!(mock
            .file_contents(&FilePath::from("public/docs/source/index.md"))
            .is_none());
    }

    #[test]
    fn test_missing_registry_is_fatal() {
        let (_mock, pal, config) = setup("route_prefix = \"api/*\"\nregistry = \"nope.json\"");
        let error = generate(&pal, &config).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read route registry nope.json"));
    }

    #[test]
    fn test_rerun_without_edits_keeps_document() {
        let (mock, pal, config) = setup("route_prefix = \"api/*\"");
        let path = FilePath::from("public/docs/source/index.md");

        generate(&pal, &config).unwrap();
        let first = mock.file_contents(&path).unwrap();
        generate(&pal, &config).unwrap();

        assert_eq!(mock.file_contents(&path).unwrap(), first);
    }
}
