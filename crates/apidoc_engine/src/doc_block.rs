/* 📖 # How are handler doc comments parsed?

Handlers carry their documentation as raw doc comments:

```text
/**
 * Show a user.
 *
 * Returns the user with the given id.
 *
 * @resource Users
 * @response {
 *   "id": 4
 * }
 */
```

The comment delimiters and leading `*` are stripped. Everything before the first `@tag`
line is the description: its first paragraph (or up to the first line ending in a period)
is the short description, the remainder the long description. Each `@tag` runs until the
next tag line, so multi-line response bodies keep their indentation.
*/

use std::sync::LazyLock;

use regex::Regex;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([A-Za-z_][A-Za-z0-9_\-]*)(?:\s+(.*))?$").expect("tag line pattern is valid")
});

/// A single `@name content` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    name: String,
    content: String,
}

impl DocTag {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag text, continuation lines included, trimmed at both ends.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Parsed documentation comment of a handler method or class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    short_description: String,
    long_description: String,
    tags: Vec<DocTag>,
}

impl DocBlock {
    /// Parses a raw doc comment. Input without `/** */` delimiters is accepted as well.
    pub fn parse(raw: &str) -> Self {
        let mut description = Vec::new();
        let mut tags = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in comment_lines(raw) {
            let tag_start = TAG_LINE.captures(line.trim_start()).map(|caps| {
                (
                    caps[1].to_string(),
                    caps.get(2).map_or(String::new(), |m| m.as_str().to_string()),
                )
            });

            if let Some((name, first_line)) = tag_start {
                if let Some((previous, body)) = current.take() {
                    tags.push(finish_tag(previous, body));
                }
                current = Some((name, vec![first_line]));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
            } else {
                description.push(line);
            }
        }
        if let Some((name, body)) = current {
            tags.push(finish_tag(name, body));
        }

        let (short_description, long_description) = split_description(&description);
        Self {
            short_description,
            long_description,
            tags,
        }
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    /// All tags with the given name, compared case-insensitively, in source order.
    pub fn tags<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a DocTag> + use<'a, 'n> {
        self.tags
            .iter()
            .filter(move |tag| tag.name.eq_ignore_ascii_case(name))
    }

    /// First tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&DocTag> {
        self.tags.iter().find(|tag| tag.name.eq_ignore_ascii_case(name))
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }
}

/// Strips comment delimiters and the leading `* ` of each line.
fn comment_lines(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix("/**").unwrap_or(trimmed);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let content = match line.trim_start().strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            };
            content.trim_end().to_string()
        })
        .collect()
}

fn finish_tag(name: String, body: Vec<String>) -> DocTag {
    DocTag {
        name,
        content: body.join("\n").trim().to_string(),
    }
}

fn split_description(lines: &[String]) -> (String, String) {
    let Some(start) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return (String::new(), String::new());
    };

    let mut short = Vec::new();
    let mut end = start;
    while end < lines.len() {
        let line = lines[end].trim();
        if line.is_empty() {
            break;
        }
        short.push(line);
        end += 1;
        if line.ends_with('.') {
            break;
        }
    }

    let long = lines[end..].join("\n").trim().to_string();
    (short.join("\n"), long)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_USER: &str = r#"/**
     * Show a user.
     *
     * Returns the user with the given id.
     * Requires authentication.
     *
     * @resource Users
     * @response {
     *   "id": 4,
     *   "name": "Jessica Jones"
     * }
     * @response Not found
     */"#;

    #[test]
    fn test_parse_descriptions() {
        let doc = DocBlock::parse(SHOW_USER);
        assert_eq!(doc.short_description(), "Show a user.");
        assert_eq!(
            doc.long_description(),
            "Returns the user with the given id.\nRequires authentication."
        );
    }

    #[test]
    fn test_multiline_tag_keeps_indentation() {
        let doc = DocBlock::parse(SHOW_USER);
        let responses: Vec<_> = doc.tags("response").map(DocTag::content).collect();
        assert_eq!(
            responses,
            vec![
                "{\n  \"id\": 4,\n  \"name\": \"Jessica Jones\"\n}",
                "Not found"
            ]
        );
    }

    #[test]
    fn test_tag_lookup_is_case_insensitive() {
        let doc = DocBlock::parse("/** @Resource Users\n * @docsHide */");
        assert_eq!(doc.tag("resource").map(DocTag::content), Some("Users"));
        assert!(doc.has_tag("DOCSHIDE"));
        assert_eq!(doc.tag("docshide").map(DocTag::content), Some(""));
    }

    #[test]
    fn test_found_tag_outlives_the_looked_up_name() {
        let doc = DocBlock::parse(SHOW_USER);
        let found = {
            let name = String::from("RESOURCE");
            doc.tag(&name)
        };
        assert_eq!(found.map(DocTag::content), Some("Users"));

        let responses: Vec<&DocTag> = {
            let name = String::from("response");
            doc.tags(&name).collect()
        };
        assert_eq!(responses.len(), 2);
    }

    #[test]
    fn test_single_line_comment() {
        let doc = DocBlock::parse("/** @resource Orders */");
        assert_eq!(doc.short_description(), "");
        assert_eq!(doc.tag("resource").map(DocTag::content), Some("Orders"));
    }

    #[test]
    fn test_short_description_stops_at_blank_line() {
        let doc = DocBlock::parse("List all orders\nfor the current user\n\nPaginated.");
        assert_eq!(doc.short_description(), "List all orders\nfor the current user");
        assert_eq!(doc.long_description(), "Paginated.");
    }

    #[test]
    fn test_plain_text_without_stars_keeps_indentation() {
        let doc = DocBlock::parse("Create a user.\n\n@response {\n  \"id\": 1\n}");
        assert_eq!(doc.short_description(), "Create a user.");
        assert_eq!(
            doc.tag("response").map(DocTag::content),
            Some("{\n  \"id\": 1\n}")
        );
    }

    #[test]
    fn test_empty_comment() {
        let doc = DocBlock::parse("/** */");
        assert_eq!(doc, DocBlock::default());
    }

    #[test]
    fn test_email_address_in_description_is_not_a_tag() {
        let doc = DocBlock::parse("Contact admin@example.com for access.");
        assert_eq!(doc.short_description(), "Contact admin@example.com for access.");
        assert!(!doc.has_tag("example"));
    }
}
