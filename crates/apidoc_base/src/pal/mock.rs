use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ErrorKind;
use crate::{ApidocError, ApidocResult};

use super::FilePath;
use super::traits::{Pal, ReadSeek};

/// In-memory PAL implementation for testing.
///
/// Clones share storage, so a test can hand one clone to the publisher and inspect
/// the written files through another.
///
/// ```
/// use apidoc_base::{MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("index.md"), b"content".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("index.md")).unwrap();
/// assert_eq!(content, "content");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    directories: Arc<Mutex<HashSet<FilePath>>>,
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.files.lock().insert(path, content);
    }

    /// Returns the stored contents of a file as UTF-8, if present.
    pub fn file_contents(&self, path: &FilePath) -> Option<String> {
        self.files
            .lock()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Returns true if `create_directory_all` was called for this path.
    pub fn has_directory(&self, path: &FilePath) -> bool {
        self.directories.lock().contains(path)
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> ApidocResult<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> ApidocResult<Box<dyn ReadSeek + 'static>> {
        let content = self
            .files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                Box::new(ApidocError::new(ErrorKind::FileError {
                    path: path.as_path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path),
                    ),
                }))
            })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn create_file(&self, path: &FilePath) -> ApidocResult<Box<dyn Write>> {
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
        }))
    }

    fn create_directory_all(&self, path: &FilePath) -> ApidocResult<()> {
        self.directories.lock().insert(path.clone());
        Ok(())
    }
}

/// Writer that stores its buffer into the mock storage when dropped.
struct MockFileWriter {
    path: FilePath,
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        self.files
            .lock()
            .insert(self.path.clone(), std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_exists() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("index.md"), b"content".to_vec());

        assert!(pal.file_exists(&FilePath::from("index.md")).unwrap());
        assert!(!pal.file_exists(&FilePath::from(".compare.md")).unwrap());
    }

    #[test]
    fn test_read_file_not_found() {
        let pal = MockPal::new();
        let result = pal.read_file(&FilePath::from("nonexistent.md"));
        assert!(matches!(
            result.err().map(|e| matches!(e.kind(), ErrorKind::FileError { .. })),
            Some(true)
        ));
    }

    #[test]
    fn test_write_string_creates_parent_directory() {
        let pal = MockPal::new();
        pal.write_string(&FilePath::from("docs/source/index.md"), "hello")
            .unwrap();

        assert!(pal.has_directory(&FilePath::from("docs/source")));
        assert_eq!(
            pal.file_contents(&FilePath::from("docs/source/index.md")),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_write_string_overwrites() {
        let pal = MockPal::new();
        let path = FilePath::from("index.md");
        pal.add_file(path.clone(), b"old".to_vec());
        pal.write_string(&path, "new").unwrap();
        assert_eq!(pal.read_file_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_clones_share_storage() {
        let pal = MockPal::new();
        let other = pal.clone();
        pal.add_file(FilePath::from("a.md"), b"a".to_vec());
        assert_eq!(other.file_contents(&FilePath::from("a.md")), Some("a".to_string()));
    }
}
