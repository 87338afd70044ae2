use super::{DirEntry, FileSystem};
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// View of a checkout that refuses to follow links out of it.
///
/// Every path is resolved through the inner file system first. Anything whose
/// real location is not under `root` behaves as if it did not exist, so a
/// symlinked `.env.example` or workspace directory pointing at the host is never
/// read.
pub struct ConfinedFileSystem {
    inner: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl ConfinedFileSystem {
    /// `root` must already be canonical
    pub fn new(inner: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let resolved = self.inner.canonicalize(path).ok()?;
        if resolved.starts_with(&self.root) {
            Some(resolved)
        } else {
            debug!(
                path = %path.display(),
                resolved = %resolved.display(),
                "Ignoring path that resolves outside the checkout"
            );
            None
        }
    }

    fn require(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path).ok_or_else(|| {
            anyhow!(
                "{} is missing or resolves outside {}",
                path.display(),
                self.root.display()
            )
        })
    }
}

impl FileSystem for ConfinedFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path)
            .is_some_and(|resolved| self.inner.is_dir(&resolved))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path)
            .is_some_and(|resolved| self.inner.is_file(&resolved))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let resolved = self.require(path)?;
        self.inner.read_to_string(&resolved)
    }

    /// Entries linking outside the checkout are dropped
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let resolved = self.require(path)?;
        Ok(self
            .inner
            .read_dir(&resolved)?
            .into_iter()
            .filter(|entry| self.resolve(&entry.path).is_some())
            .collect())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.require(path)
    }
}
