use relative_path::{RelativePath, RelativePathBuf};
use std::path::Path;

/* 📖 # Why are output paths relative?

The publisher writes `source/index.md`, `source/.compare.md` and `collection.json`
below a configured output directory. FilePath keeps every one of those paths relative
to the PAL's base directory, so the same publishing code runs against RealPal (rooted
at the working directory) and MockPal (rooted nowhere).
*/

/// Path relative to the PAL base directory.
///
/// ```
/// use apidoc_base::FilePath;
///
/// let output = FilePath::from("public/docs");
/// assert_eq!(output.join("source/index.md").to_string(), "public/docs/source/index.md");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// Returns the underlying relative path.
    pub fn as_relative(&self) -> &RelativePath {
        &self.0
    }

    /// Converts to a std Path, for joining onto a base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// Appends a relative segment.
    pub fn join(&self, segment: impl AsRef<str>) -> FilePath {
        FilePath(self.0.join(segment.as_ref()))
    }

    /// Returns the parent directory, if any.
    pub fn parent(&self) -> Option<FilePath> {
        self.0
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .map(|p| FilePath(p.to_relative_path_buf()))
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(RelativePathBuf::from(p.to_string_lossy().into_owned()))
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_nested_segments() {
        let path = FilePath::from("public/docs").join("source").join(".compare.md");
        assert_eq!(path.to_string(), "public/docs/source/.compare.md");
    }

    #[test]
    fn test_parent_of_nested_file() {
        let path = FilePath::from("public/docs/collection.json");
        assert_eq!(path.parent(), Some(FilePath::from("public/docs")));
    }

    #[test]
    fn test_parent_of_top_level_file_is_none() {
        assert_eq!(FilePath::from("collection.json").parent(), None);
    }

    #[test]
    fn test_as_path() {
        let path = FilePath::from(String::from("docs/index.md"));
        assert_eq!(path.as_path(), Path::new("docs/index.md"));
    }
}
