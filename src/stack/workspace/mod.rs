//! Workspace managers
//!
//! Workspace managers are tools that split one checkout into several packages (pnpm,
//! Nx, Turborepo, Cargo workspaces, Maven reactors...). Each implementation knows its
//! marker files and how to read the member globs out of them; glob resolution is
//! shared in [`glob`].

use crate::error::ParseError;
use crate::fs::FileSystem;
use std::path::Path;
use std::sync::Arc;

pub mod cargo;
pub mod glob;
pub mod go;
pub mod jvm;
pub mod node;

pub use cargo::CargoWorkspace;
pub use go::GoWorkspace;
pub use jvm::{GradleMultiProject, MavenReactor};
pub use node::{LernaWorkspace, NpmWorkspaces, NxWorkspace, PnpmWorkspace, TurborepoWorkspace, YarnWorkspaces};

crate::define_id_enum! {
    /// Workspace manager identifier
    WorkspaceManagerId {
        Pnpm => "pnpm" : "pnpm workspaces",
        Nx => "nx" : "Nx",
        Turborepo => "turborepo" : "Turborepo" | "turbo",
        Lerna => "lerna" : "Lerna",
        Yarn => "yarn" : "Yarn workspaces",
        Npm => "npm" : "npm workspaces",
        Cargo => "cargo" : "Cargo workspace",
        Go => "go" : "Go workspace",
        Maven => "maven" : "Maven multi-module",
        Gradle => "gradle" : "Gradle multi-project",
    }
}

/// Workspace manager trait
pub trait WorkspaceManager: Send + Sync {
    fn id(&self) -> WorkspaceManagerId;

    /// Files that must all exist in the checkout root for this manager to apply
    fn marker_files(&self) -> &[&str];

    fn is_present(&self, fs: &dyn FileSystem, root: &Path) -> bool {
        self.marker_files()
            .iter()
            .all(|marker| fs.is_file(&root.join(marker)))
    }

    /// Member globs declared by the manager, `!`-prefixed for exclusions.
    ///
    /// Only called when [`WorkspaceManager::is_present`] holds. Malformed marker
    /// content is a [`ParseError`]; a marker that declares no members yields an
    /// empty list.
    fn workspace_patterns(&self, fs: &dyn FileSystem, root: &Path)
        -> Result<Vec<String>, ParseError>;
}

/// Managers in detection priority order
pub fn default_managers() -> Vec<Arc<dyn WorkspaceManager>> {
    vec![
        Arc::new(PnpmWorkspace),
        Arc::new(NxWorkspace),
        Arc::new(TurborepoWorkspace),
        Arc::new(LernaWorkspace),
        Arc::new(YarnWorkspaces),
        Arc::new(NpmWorkspaces),
        Arc::new(CargoWorkspace),
        Arc::new(GoWorkspace),
        Arc::new(MavenReactor),
        Arc::new(GradleMultiProject),
    ]
}
