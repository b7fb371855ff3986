use tracing::{debug, info, instrument};

use apidoc_base::{ApidocResult, FilePath, PalHandle, ResultExt};

use crate::collection::PostmanCollection;
use crate::config::Config;
use crate::merge::{Preamble, PreservedEdit, merge};
use crate::render::Renderer;
use crate::summary::RouteSummary;

/// Published document, relative to the output directory.
pub const DOCUMENT_FILE: &str = "source/index.md";
/// Snapshot of the last fresh rendering, relative to the output directory.
pub const SNAPSHOT_FILE: &str = "source/.compare.md";
/// Exported collection, relative to the output directory.
pub const COLLECTION_FILE: &str = "collection.json";

/// Everything the publisher needs to know about where and how to write.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub output: FilePath,
    pub title: String,
    pub base_url: String,
    /// Link target for the collection in a freshly generated info block.
    pub collection_url: String,
    pub no_postman_collection: bool,
}

impl From<&Config> for PublishSettings {
    fn from(config: &Config) -> Self {
        Self {
            output: config.output_dir(),
            title: config.title.clone(),
            base_url: config.base_url.clone(),
            collection_url: config.collection_url(),
            no_postman_collection: config.no_postman_collection,
        }
    }
}

/// What a publish run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub routes: usize,
    pub preserved: Vec<PreservedEdit>,
    pub collection_written: bool,
}

/// Renders routes and writes the published document, the snapshot and the collection.
#[derive(Debug, Clone)]
pub struct Publisher {
    pal: PalHandle,
    settings: PublishSettings,
}

impl Publisher {
    pub fn new(pal: PalHandle, settings: PublishSettings) -> Self {
        Self { pal, settings }
    }

    pub fn document_path(&self) -> FilePath {
        self.settings.output.join(DOCUMENT_FILE)
    }

    pub fn snapshot_path(&self) -> FilePath {
        self.settings.output.join(SNAPSHOT_FILE)
    }

    pub fn collection_path(&self) -> FilePath {
        self.settings.output.join(COLLECTION_FILE)
    }

    fn default_preamble(&self) -> Preamble {
        let link = (!self.settings.no_postman_collection)
            .then_some(self.settings.collection_url.as_str());
        Preamble::generate(&self.settings.title, link)
    }

    /// Reads a previous output file; a missing file is `None`, any other failure propagates.
    fn read_previous(&self, path: &FilePath) -> ApidocResult<Option<String>> {
        if !self.pal.file_exists(path)? {
            debug!(%path, "no previous file");
            return Ok(None);
        }
        self.pal
            .read_file_to_string(path)
            .with_context(|| format!("Failed to read {}", path))
            .map(Some)
    }

    #[instrument(skip_all, fields(output = %self.settings.output, routes = routes.len()))]
    pub fn publish(&self, routes: &[RouteSummary]) -> ApidocResult<PublishReport> {
        let published = self.read_previous(&self.document_path())?;
        let snapshot = self.read_previous(&self.snapshot_path())?;

        let fresh = Renderer::new(&self.settings.base_url).render_all(routes);
        let outcome = merge(
            &fresh,
            published.as_deref(),
            snapshot.as_deref(),
            &self.default_preamble(),
        );

        self.pal
            .write_string(&self.document_path(), &outcome.document)
            .with_context(|| format!("Failed to write {}", self.document_path()))?;
        self.pal
            .write_string(&self.snapshot_path(), &outcome.snapshot)
            .with_context(|| format!("Failed to write {}", self.snapshot_path()))?;
        info!(path = %self.document_path(), "wrote documentation");

        let collection_written = if self.settings.no_postman_collection {
            false
        } else {
            let collection =
                PostmanCollection::build(&self.settings.title, &self.settings.base_url, routes)?;
            self.pal
                .write_string(&self.collection_path(), &collection.to_json()?)
                .with_context(|| format!("Failed to write {}", self.collection_path()))?;
            info!(path = %self.collection_path(), "wrote Postman collection");
            true
        };

        Ok(PublishReport {
            routes: routes.len(),
            preserved: outcome.preserved,
            collection_written,
        })
    }
}
