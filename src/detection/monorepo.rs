//! Monorepo layout detection

use crate::detection::types::MonorepoInfo;
use crate::error::ParseError;
use crate::fs::FileSystem;
use crate::stack::workspace::{self, glob, WorkspaceManager};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Classifies a checkout as single-app or one of the known workspace layouts
#[derive(Clone)]
pub struct MonorepoDetector {
    fs: Arc<dyn FileSystem>,
    managers: Vec<Arc<dyn WorkspaceManager>>,
}

impl MonorepoDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            managers: workspace::default_managers(),
        }
    }

    /// Replace the manager table; earlier entries take precedence
    pub fn with_managers(mut self, managers: Vec<Arc<dyn WorkspaceManager>>) -> Self {
        self.managers = managers;
        self
    }

    /// Same manager table, reading through `fs`
    pub fn with_file_system(&self, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            managers: self.managers.clone(),
        }
    }

    /// The first manager whose markers are present and whose globs resolve to at
    /// least one directory wins.
    pub fn detect(&self, path: &Path) -> Result<MonorepoInfo, ParseError> {
        for manager in &self.managers {
            if !manager.is_present(self.fs.as_ref(), path) {
                continue;
            }

            let patterns = manager.workspace_patterns(self.fs.as_ref(), path)?;
            let workspace_paths = glob::resolve_patterns(self.fs.as_ref(), path, &patterns);

            if workspace_paths.is_empty() {
                debug!(
                    manager = %manager.id(),
                    patterns = ?patterns,
                    "Workspace marker present but no workspace directories resolved"
                );
                continue;
            }

            debug!(
                manager = %manager.id(),
                workspaces = workspace_paths.len(),
                "Detected monorepo"
            );
            return Ok(MonorepoInfo::new(manager.id().id(), workspace_paths));
        }

        Ok(MonorepoInfo::not_monorepo())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::stack::workspace::{CargoWorkspace, NpmWorkspaces};

    fn detector(fs: MockFileSystem) -> MonorepoDetector {
        MonorepoDetector::new(Arc::new(fs))
    }

    fn root() -> &'static Path {
        Path::new("/mock")
    }

    #[test]
    fn test_single_app_is_not_monorepo() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"name": "app", "dependencies": {"express": "4"}}"#);

        let info = detector(fs).detect(root()).unwrap();
        assert_eq!(info, MonorepoInfo::not_monorepo());
    }

    #[test]
    fn test_pnpm_workspace() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"name": "root", "private": true}"#);
        fs.add_file("pnpm-workspace.yaml", "packages:\n  - apps/*\n");
        fs.add_file("apps/web/package.json", "{}");
        fs.add_file("apps/api/package.json", "{}");

        let info = detector(fs).detect(root()).unwrap();
        assert!(info.is_monorepo);
        assert_eq!(info.workspace_type.as_deref(), Some("pnpm"));
        assert_eq!(info.workspace_paths, vec!["apps/api", "apps/web"]);
    }

    #[test]
    fn test_turborepo_wins_over_npm_workspaces() {
        let fs = MockFileSystem::new();
        fs.add_file("turbo.json", "{}");
        fs.add_file("package.json", r#"{"workspaces": ["apps/*"]}"#);
        fs.add_dir("apps/web");

        let info = detector(fs).detect(root()).unwrap();
        assert_eq!(info.workspace_type.as_deref(), Some("turborepo"));
        assert_eq!(info.workspace_paths, vec!["apps/web"]);
    }

    #[test]
    fn test_yarn_when_lockfile_present() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"workspaces": ["packages/*"]}"#);
        fs.add_file("yarn.lock", "");
        fs.add_dir("packages/ui");

        let info = detector(fs).detect(root()).unwrap();
        assert_eq!(info.workspace_type.as_deref(), Some("yarn"));
    }

    #[test]
    fn test_marker_without_directories_falls_through() {
        let fs = MockFileSystem::new();
        // nx.json present but none of its default globs exist; Cargo resolves
        fs.add_file("nx.json", "{}");
        fs.add_file("Cargo.toml", "[workspace]\nmembers = [\"crates/*\"]\n");
        fs.add_dir("crates/core");

        let info = detector(fs).detect(root()).unwrap();
        assert_eq!(info.workspace_type.as_deref(), Some("cargo"));
        assert_eq!(info.workspace_paths, vec!["crates/core"]);
    }

    #[test]
    fn test_malformed_marker_is_parse_error() {
        let fs = MockFileSystem::new();
        fs.add_file("lerna.json", "{ broken");

        let err = detector(fs).detect(root()).unwrap_err();
        assert!(err.file.ends_with("lerna.json"));
    }

    #[test]
    fn test_custom_manager_order() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"workspaces": ["js/*"]}"#);
        fs.add_file("Cargo.toml", "[workspace]\nmembers = [\"rs/*\"]\n");
        fs.add_dir("js/web");
        fs.add_dir("rs/api");

        let detector = detector(fs).with_managers(vec![
            Arc::new(CargoWorkspace),
            Arc::new(NpmWorkspaces),
        ]);
        let info = detector.detect(root()).unwrap();
        assert_eq!(info.workspace_type.as_deref(), Some("cargo"));
    }
}
