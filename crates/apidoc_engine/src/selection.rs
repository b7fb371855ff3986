use std::collections::BTreeSet;

use globset::{GlobBuilder, GlobMatcher};

use apidoc_base::{ApidocResult, bail, err};

use crate::descriptor::EndpointDescriptor;

const NO_CRITERIA: &str =
    "You must provide either a route prefix or a route name to generate the documentation";

/// Decides which registered routes are documented.
///
/// A route is selected when its name is allowed or its URI matches the prefix pattern.
/// In the pattern `*` matches any run of characters, `/` included. Every other character,
/// the `{}` and `?` of placeholders among them, only matches itself.
#[derive(Debug, Clone)]
pub struct RouteSelection {
    allowed_names: BTreeSet<String>,
    uri_pattern: Option<GlobMatcher>,
}

impl RouteSelection {
    /// Fails when neither names nor a pattern are given: documenting nothing (or
    /// everything) by accident is worse than refusing to run.
    pub fn new<I, S>(allowed_names: I, uri_pattern: Option<&str>) -> ApidocResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed_names: BTreeSet<String> = allowed_names.into_iter().map(Into::into).collect();
        let uri_pattern = uri_pattern.filter(|pattern| !pattern.is_empty());

        if allowed_names.is_empty() && uri_pattern.is_none() {
            bail!("{}", NO_CRITERIA);
        }

        let uri_pattern = match uri_pattern {
            Some(pattern) => Some(
                GlobBuilder::new(&star_only_glob(pattern))
                    .literal_separator(false)
                    .backslash_escape(false)
                    .build()
                    .map_err(|e| err!("Invalid route prefix '{}': {}", pattern, e))?
                    .compile_matcher(),
            ),
            None => None,
        };

        Ok(Self {
            allowed_names,
            uri_pattern,
        })
    }

    pub fn matches(&self, descriptor: &EndpointDescriptor) -> bool {
        let by_name = descriptor
            .name()
            .is_some_and(|name| self.allowed_names.contains(name));
        let by_uri = self
            .uri_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(descriptor.uri()));
        by_name || by_uri
    }
}

/// Escapes every glob metacharacter except `*`. Runs of `*` collapse into one.
fn star_only_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    for (index, literal) in pattern.split('*').enumerate() {
        if index > 0 && !glob.ends_with('*') {
            glob.push('*');
        }
        glob.push_str(&globset::escape(literal));
    }
    glob
}
