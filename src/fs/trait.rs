//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Abstraction over the checkout's file system so detectors can run against fixtures
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List directory contents, sorted by name
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Resolve symlinks and relative components
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Read a file that may legitimately be absent.
    ///
    /// Returns `Ok(None)` when the file does not exist and an error only when an
    /// existing file cannot be read.
    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        if !self.is_file(path) {
            return Ok(None);
        }
        self.read_to_string(path).map(Some)
    }

    /// First existing file among `candidates` inside `dir`
    fn find_first(&self, dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|path| self.is_file(path))
    }
}
