//! Sandboxing checks for checkout paths

use super::disk_usage::{DiskUsageProbe, DuProbe};
use crate::config::AnalyzerConfig;
use crate::error::PathSecurityError;
use crate::fs::{FileSystem, RealFileSystem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Ensures a checkout lives strictly inside the scratch root and is not oversized
pub struct PathGuard {
    fs: Arc<dyn FileSystem>,
    probe: Arc<dyn DiskUsageProbe>,
    scratch_root: PathBuf,
    max_size_bytes: u64,
}

impl PathGuard {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        probe: Arc<dyn DiskUsageProbe>,
        scratch_root: impl Into<PathBuf>,
        max_size_bytes: u64,
    ) -> Self {
        Self {
            fs,
            probe,
            scratch_root: scratch_root.into(),
            max_size_bytes,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(
            Arc::new(RealFileSystem),
            Arc::new(DuProbe),
            config.scratch_root.clone(),
            config.max_repo_size_bytes,
        )
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Validate `path`: existing directory, strictly below the scratch root after
    /// resolving symlinks and `..`, and no larger than the ceiling.
    ///
    /// Checks run in that order, so the size probe only runs for contained paths.
    pub fn validate(&self, path: &Path) -> Result<(), PathSecurityError> {
        if !self.fs.exists(path) {
            return Err(PathSecurityError::NotFound(path.to_path_buf()));
        }

        let resolved = self
            .fs
            .canonicalize(path)
            .map_err(|_| PathSecurityError::NotFound(path.to_path_buf()))?;

        if !self.fs.is_dir(&resolved) {
            return Err(PathSecurityError::NotADirectory(path.to_path_buf()));
        }

        let root = self
            .fs
            .canonicalize(&self.scratch_root)
            .map_err(|_| PathSecurityError::InvalidScratchRoot(self.scratch_root.clone()))?;

        if resolved == root || !resolved.starts_with(&root) {
            return Err(PathSecurityError::OutsideScratchRoot {
                path: resolved,
                root,
            });
        }

        let size_bytes = self.probe.size_bytes(&resolved).map_err(|source| {
            PathSecurityError::SizeProbeFailed {
                path: resolved.clone(),
                source,
            }
        })?;

        if size_bytes > self.max_size_bytes {
            return Err(PathSecurityError::TooLarge {
                path: resolved,
                size_bytes,
                limit_bytes: self.max_size_bytes,
            });
        }

        debug!(
            path = %resolved.display(),
            size_bytes,
            "Checkout passed path validation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::security::FixedSizeProbe;
    use anyhow::anyhow;

    struct FailingProbe;

    impl DiskUsageProbe for FailingProbe {
        fn size_bytes(&self, _path: &Path) -> anyhow::Result<u64> {
            Err(anyhow!("du: permission denied"))
        }
    }

    fn mock_guard(size: u64) -> PathGuard {
        let fs = MockFileSystem::with_root(PathBuf::from("/scratch"));
        fs.add_file("repo/package.json", "{}");
        fs.add_file("/etc/passwd", "root:x:0:0");
        PathGuard::new(
            Arc::new(fs),
            Arc::new(FixedSizeProbe(size)),
            "/scratch",
            1024,
        )
    }

    #[test]
    fn test_accepts_contained_directory() {
        assert!(mock_guard(10).validate(Path::new("/scratch/repo")).is_ok());
    }

    #[test]
    fn test_rejects_missing_path() {
        let err = mock_guard(10)
            .validate(Path::new("/scratch/missing"))
            .unwrap_err();
        assert!(matches!(err, PathSecurityError::NotFound(_)));
    }

    #[test]
    fn test_rejects_file() {
        let err = mock_guard(10)
            .validate(Path::new("/scratch/repo/package.json"))
            .unwrap_err();
        assert!(matches!(err, PathSecurityError::NotADirectory(_)));
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let err = mock_guard(10)
            .validate(Path::new("/scratch/repo/../../etc"))
            .unwrap_err();
        assert!(matches!(err, PathSecurityError::OutsideScratchRoot { .. }));
    }

    #[test]
    fn test_rejects_scratch_root_itself() {
        let err = mock_guard(10).validate(Path::new("/scratch")).unwrap_err();
        assert!(matches!(err, PathSecurityError::OutsideScratchRoot { .. }));
    }

    #[test]
    fn test_rejects_oversized_checkout() {
        let err = mock_guard(2048)
            .validate(Path::new("/scratch/repo"))
            .unwrap_err();
        match err {
            PathSecurityError::TooLarge {
                size_bytes,
                limit_bytes,
                ..
            } => {
                assert_eq!(size_bytes, 2048);
                assert_eq!(limit_bytes, 1024);
            }
            other => panic!("Expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_failure_is_reported() {
        let fs = MockFileSystem::with_root(PathBuf::from("/scratch"));
        fs.add_dir("repo");
        let guard = PathGuard::new(Arc::new(fs), Arc::new(FailingProbe), "/scratch", 1024);

        let err = guard.validate(Path::new("/scratch/repo")).unwrap_err();
        assert!(matches!(err, PathSecurityError::SizeProbeFailed { .. }));
    }
}
