/* 📖 # How does regeneration keep manual edits?

Each run writes two files: the published document, which humans may edit, and a snapshot
holding exactly what was generated, which nobody edits. On the next run every route region
in the published document is compared with the same region in the snapshot:

- region missing from the published document: use the fresh rendering
- region missing from the snapshot, or identical to it: nobody touched it, use the fresh rendering
- region differs from the snapshot: a human edited it, keep it verbatim and warn

The snapshot is then replaced by the fresh rendering, so an edit stays detectable on every
later run. Routes that no longer exist simply do not appear in the new document.

The merge itself is a pure function over strings. Reading and writing the files is the
publisher's job.
*/

use tracing::warn;

use crate::render::RenderedRoute;
use crate::summary::{RouteId, group_by};

const FRONT_MATTER_DELIMITER: &str = "---";
const INFO_START: &str = "<!-- START_INFO -->";
const INFO_END: &str = "<!-- END_INFO -->";

/// Returns the region from `start` through `end`, markers included.
pub fn find_region<'a>(document: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let begin = document.find(start)?;
    let end_offset = document[begin + start.len()..].find(end)?;
    Some(&document[begin..begin + start.len() + end_offset + end.len()])
}

/// Returns the text between `start` and `end`, without the newline directly after the
/// start marker and the one directly before the end marker.
fn region_body<'a>(document: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let region = find_region(document, start, end)?;
    let inner = &region[start.len()..region.len() - end.len()];
    let inner = inner.strip_prefix('\n').unwrap_or(inner);
    Some(inner.strip_suffix('\n').unwrap_or(inner))
}

/// The part of the document before the first group: front matter and info block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub front_matter: String,
    pub info: String,
}

impl Preamble {
    pub fn new(front_matter: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            front_matter: front_matter.into(),
            info: info.into(),
        }
    }

    /// Preamble of a document that has never been published.
    ///
    /// `collection_url` adds a download link to the info block.
    pub fn generate(title: &str, collection_url: Option<&str>) -> Self {
        let front_matter = format!(
            "title: {}\n\nlanguage_tabs:\n- bash\n- javascript\n\nincludes:\n\nsearch: true",
            title
        );
        let mut info = "# Info\n\nWelcome to the generated API reference.".to_string();
        if let Some(url) = collection_url {
            info.push_str(&format!("\n[Get Postman Collection]({})", url));
        }
        Self::new(front_matter, info)
    }

    /// Takes front matter and info block from a published document, falling back to
    /// `default` for whichever part is missing.
    pub fn carry_over(document: &str, default: &Preamble) -> Self {
        let front_matter = parse_front_matter(document)
            .map(str::to_string)
            .unwrap_or_else(|| default.front_matter.clone());
        let info = region_body(document, INFO_START, INFO_END)
            .map(str::to_string)
            .unwrap_or_else(|| default.info.clone());
        Self::new(front_matter, info)
    }

    fn write(&self, out: &mut String) {
        out.push_str(&format!(
            "{delim}\n{}\n{delim}\n\n{}\n{}\n{}\n",
            self.front_matter,
            INFO_START,
            self.info,
            INFO_END,
            delim = FRONT_MATTER_DELIMITER
        ));
    }
}

fn parse_front_matter(document: &str) -> Option<&str> {
    let rest = document
        .strip_prefix(FRONT_MATTER_DELIMITER)?
        .strip_prefix('\n')?;
    let end = rest.find(&format!("\n{}\n", FRONT_MATTER_DELIMITER))?;
    Some(&rest[..end])
}

/// A route whose published region was edited by hand and kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreservedEdit {
    pub id: RouteId,
    pub route: String,
}

/// Result of merging fresh renderings into the published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The new published document.
    pub document: String,
    /// The new snapshot: the fresh rendering, unconditionally.
    pub snapshot: String,
    pub preserved: Vec<PreservedEdit>,
}

/// Merges freshly rendered routes with the previously published document and snapshot.
///
/// `fresh` is in extraction order; grouping and group order are applied here.
pub fn merge(
    fresh: &[RenderedRoute],
    published: Option<&str>,
    snapshot: Option<&str>,
    default_preamble: &Preamble,
) -> MergeOutcome {
    let preamble = match published {
        Some(document) => Preamble::carry_over(document, default_preamble),
        None => default_preamble.clone(),
    };

    let groups = group_by(fresh, |route| route.group.as_str());
    let mut preserved = Vec::new();
    let mut document = String::new();
    let mut fresh_document = String::new();
    preamble.write(&mut document);
    preamble.write(&mut fresh_document);

    for (group, routes) in &groups {
        let heading = format!("\n#{}\n", group);
        document.push_str(&heading);
        fresh_document.push_str(&heading);

        for route in routes {
            let region = resolve_region(route, published, snapshot);
            if region != route.text {
                warn!(route = %route.label, "Skipping modified route {}", route.label);
                preserved.push(PreservedEdit {
                    id: route.id.clone(),
                    route: route.label.clone(),
                });
            }
            document.push_str(&format!("\n{}\n", region));
            fresh_document.push_str(&format!("\n{}\n", route.text));
        }
    }

    MergeOutcome {
        document,
        snapshot: fresh_document,
        preserved,
    }
}

fn resolve_region<'a>(
    route: &'a RenderedRoute,
    published: Option<&'a str>,
    snapshot: Option<&'a str>,
) -> &'a str {
    let start = route.id.start_marker();
    let end = route.id.end_marker();

    let Some(current) = published.and_then(|doc| find_region(doc, &start, &end)) else {
        return &route.text;
    };
    match snapshot.and_then(|doc| find_region(doc, &start, &end)) {
        Some(original) if original != current => current,
        _ => &route.text,
    }
}
