use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::error::ErrorKind;
use crate::{ApidocError, ApidocResult};

use super::file_path::FilePath;

/// Trait combining Read + Seek for file operations.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/* 📖 # Why is Pal a trait instead of a struct?

The merge engine's correctness depends on what was written by the previous run.
Tests simulate "previous runs" and "human edits" by seeding a MockPal, and the binary
uses RealPal. Both satisfy the same trait, so the publisher is unaware of the difference.
*/

/// Platform Abstraction Layer (PAL) trait providing filesystem operations.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> ApidocResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> ApidocResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> ApidocResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(ApidocError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        })?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, overwriting if it exists.
    fn create_file(&self, path: &FilePath) -> ApidocResult<Box<dyn Write>>;

    /// Create a directory and all parent directories.
    fn create_directory_all(&self, path: &FilePath) -> ApidocResult<()>;

    /// Replace the file's contents with `contents`, creating parent directories first.
    fn write_string(&self, path: &FilePath, contents: &str) -> ApidocResult<()> {
        if let Some(parent) = path.parent() {
            self.create_directory_all(&parent)?;
        }
        let mut writer = self.create_file(path)?;
        writer
            .write_all(contents.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| {
                Box::new(ApidocError::new(ErrorKind::FileError {
                    path: path.as_path().to_path_buf(),
                    source: e,
                }))
            })
    }
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// ```no_run
/// use apidoc_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone();
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
