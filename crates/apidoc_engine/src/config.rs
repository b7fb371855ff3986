use serde::Deserialize;
use tracing::{debug, instrument};

use apidoc_base::{ApidocResult, FilePath, PalHandle, ResultExt, bail, err};

use crate::extractor::ExtractionOptions;
use crate::selection::RouteSelection;

/// Name of the configuration file the binary looks for.
pub const CONFIG_FILE: &str = "apidoc.toml";

/// Configuration of a documentation run, read from `apidoc.toml`.
///
/// ```toml
/// title = "API Reference"
/// base_url = "http://localhost"
/// output = "public/docs"
/// registry = "routes.json"
/// routes = ["users.show"]
/// route_prefix = "api/*"
/// skip_type_checks = false
/// no_postman_collection = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Document title used when nothing has been published yet.
    pub title: String,
    /// Prefix of example request and collection URLs.
    pub base_url: String,
    /// Output directory, relative to the working directory.
    pub output: String,
    /// Route registry file (JSON).
    pub registry: String,
    /// Route names to document regardless of their URI.
    pub routes: Vec<String>,
    /// URI glob of routes to document.
    pub route_prefix: Option<String>,
    pub skip_type_checks: bool,
    pub no_postman_collection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "API Reference".to_string(),
            base_url: "http://localhost".to_string(),
            output: "public/docs".to_string(),
            registry: "routes.json".to_string(),
            routes: Vec::new(),
            route_prefix: None,
            skip_type_checks: false,
            no_postman_collection: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(toml: &str) -> ApidocResult<Self> {
        toml::from_str(toml).map_err(|e| err!("Failed to parse configuration: {}", e))
    }

    /// Rejects configurations that can never document anything.
    pub fn validate(&self) -> ApidocResult<()> {
        if self.output.trim().is_empty() {
            bail!("The output directory must not be empty");
        }
        self.selection().map(|_| ())
    }

    pub fn selection(&self) -> ApidocResult<RouteSelection> {
        RouteSelection::new(self.routes.iter().cloned(), self.route_prefix.as_deref())
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        ExtractionOptions {
            skip_type_checks: self.skip_type_checks,
        }
    }

    pub fn output_dir(&self) -> FilePath {
        FilePath::from(self.output.trim_end_matches('/'))
    }

    pub fn registry_path(&self) -> FilePath {
        FilePath::from(self.registry.as_str())
    }

    /// Public URL of the exported collection, as linked from the info block.
    ///
    /// A leading `public/` is dropped from the output directory, since that is where
    /// web servers usually serve from.
    pub fn collection_url(&self) -> String {
        let output = self.output.trim_matches('/');
        let public_path = output.strip_prefix("public/").unwrap_or(output);
        format!(
            "{}/{}/collection.json",
            self.base_url.trim_end_matches('/'),
            public_path
        )
    }
}

/// Loads and parses a configuration file through the PAL.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_config(pal: &PalHandle, path: &FilePath) -> ApidocResult<Config> {
    let toml = pal
        .read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path))?;
    let config = Config::from_toml_str(&toml).with_context(|| path.to_string())?;
    debug!(title = %config.title, output = %config.output, "configuration loaded");
    Ok(config)
}
