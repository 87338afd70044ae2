//! Cargo workspaces

use super::{WorkspaceManager, WorkspaceManagerId};
use crate::error::ParseError;
use crate::extractors::parsers::read_optional;
use crate::fs::FileSystem;
use std::path::Path;

pub struct CargoWorkspace;

impl WorkspaceManager for CargoWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Cargo
    }

    fn marker_files(&self) -> &[&str] {
        &["Cargo.toml"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let path = root.join("Cargo.toml");
        let Some(content) = read_optional(fs, &path)? else {
            return Ok(Vec::new());
        };
        let manifest: toml::Value =
            toml::from_str(&content).map_err(|e| ParseError::new(&path, e.to_string()))?;

        let Some(workspace) = manifest.get("workspace") else {
            return Ok(Vec::new());
        };

        let list = |key: &str| -> Vec<String> {
            workspace
                .get(key)
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut patterns = list("members");
        patterns.extend(list("exclude").into_iter().map(|e| format!("!{}", e)));
        Ok(patterns)
    }
}
