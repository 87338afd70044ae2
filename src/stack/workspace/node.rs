//! JavaScript workspace managers

use super::{WorkspaceManager, WorkspaceManagerId};
use crate::error::ParseError;
use crate::extractors::parsers::read_optional;
use crate::fs::FileSystem;
use serde_json::Value;
use std::path::Path;

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(String::from)
        .collect()
}

fn parse_json(path: &Path, content: &str) -> Result<Value, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::new(path, e.to_string()))
}

/// `workspaces` from the root package.json, as an array or `{ packages: [...] }`
fn package_json_workspaces(
    fs: &dyn FileSystem,
    root: &Path,
) -> Result<Option<Vec<String>>, ParseError> {
    let path = root.join("package.json");
    let Some(content) = read_optional(fs, &path)? else {
        return Ok(None);
    };
    let value = parse_json(&path, &content)?;

    let patterns = match value.get("workspaces") {
        Some(Value::Array(items)) => Some(string_items(items)),
        Some(Value::Object(obj)) => obj
            .get("packages")
            .and_then(|p| p.as_array())
            .map(|items| string_items(items)),
        _ => None,
    };
    Ok(patterns)
}

/// Validate a JSON marker file and fall back to package.json workspaces or defaults
fn orchestrator_patterns(
    fs: &dyn FileSystem,
    root: &Path,
    marker: &str,
    defaults: &[&str],
) -> Result<Vec<String>, ParseError> {
    let marker_path = root.join(marker);
    if let Some(content) = read_optional(fs, &marker_path)? {
        parse_json(&marker_path, &content)?;
    }

    Ok(package_json_workspaces(fs, root)?
        .filter(|patterns| !patterns.is_empty())
        .unwrap_or_else(|| defaults.iter().map(|d| d.to_string()).collect()))
}

pub struct PnpmWorkspace;

impl WorkspaceManager for PnpmWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Pnpm
    }

    fn marker_files(&self) -> &[&str] {
        &["pnpm-workspace.yaml"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let path = root.join("pnpm-workspace.yaml");
        let Some(content) = read_optional(fs, &path)? else {
            return Ok(Vec::new());
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| ParseError::new(&path, e.to_string()))?;

        Ok(value
            .get("packages")
            .and_then(|p| p.as_sequence())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct NxWorkspace;

impl WorkspaceManager for NxWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Nx
    }

    fn marker_files(&self) -> &[&str] {
        &["nx.json"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        orchestrator_patterns(fs, root, "nx.json", &["apps/*", "libs/*", "packages/*"])
    }
}

pub struct TurborepoWorkspace;

impl WorkspaceManager for TurborepoWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Turborepo
    }

    fn marker_files(&self) -> &[&str] {
        &["turbo.json"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        orchestrator_patterns(fs, root, "turbo.json", &["apps/*", "packages/*"])
    }
}

pub struct LernaWorkspace;

impl WorkspaceManager for LernaWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Lerna
    }

    fn marker_files(&self) -> &[&str] {
        &["lerna.json"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let path = root.join("lerna.json");
        let Some(content) = read_optional(fs, &path)? else {
            return Ok(Vec::new());
        };
        let value = parse_json(&path, &content)?;

        Ok(match value.get("packages").and_then(|p| p.as_array()) {
            Some(items) => string_items(items),
            None => vec!["packages/*".to_string()],
        })
    }
}

pub struct YarnWorkspaces;

impl WorkspaceManager for YarnWorkspaces {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Yarn
    }

    fn marker_files(&self) -> &[&str] {
        &["package.json", "yarn.lock"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        Ok(package_json_workspaces(fs, root)?.unwrap_or_default())
    }
}

pub struct NpmWorkspaces;

impl WorkspaceManager for NpmWorkspaces {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Npm
    }

    fn marker_files(&self) -> &[&str] {
        &["package.json"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        Ok(package_json_workspaces(fs, root)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn root() -> &'static Path {
        Path::new("/mock")
    }

    #[test]
    fn test_pnpm_packages() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pnpm-workspace.yaml",
            "packages:\n  - 'apps/*'\n  - 'packages/*'\n  - '!**/test/**'\n",
        );

        let patterns = PnpmWorkspace.workspace_patterns(&fs, root()).unwrap();
        assert_eq!(patterns, vec!["apps/*", "packages/*", "!**/test/**"]);
    }

    #[test]
    fn test_pnpm_invalid_yaml() {
        let fs = MockFileSystem::new();
        fs.add_file("pnpm-workspace.yaml", "packages: [apps/*\n");

        let err = PnpmWorkspace.workspace_patterns(&fs, root()).unwrap_err();
        assert!(err.file.ends_with("pnpm-workspace.yaml"));
    }

    #[test]
    fn test_npm_workspaces_object_form() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "package.json",
            r#"{"private": true, "workspaces": {"packages": ["services/*"], "nohoist": ["**/react"]}}"#,
        );

        let patterns = NpmWorkspaces.workspace_patterns(&fs, root()).unwrap();
        assert_eq!(patterns, vec!["services/*"]);
    }

    #[test]
    fn test_yarn_requires_lockfile() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"workspaces": ["apps/*"]}"#);
        assert!(!YarnWorkspaces.is_present(&fs, root()));

        fs.add_file("yarn.lock", "");
        assert!(YarnWorkspaces.is_present(&fs, root()));
    }

    #[test]
    fn test_turborepo_defaults_without_workspaces() {
        let fs = MockFileSystem::new();
        fs.add_file("turbo.json", r#"{"pipeline": {}}"#);
        fs.add_file("package.json", r#"{"name": "root"}"#);

        let patterns = TurborepoWorkspace.workspace_patterns(&fs, root()).unwrap();
        assert_eq!(patterns, vec!["apps/*", "packages/*"]);
    }

    #[test]
    fn test_nx_rejects_malformed_marker() {
        let fs = MockFileSystem::new();
        fs.add_file("nx.json", "{ not json");

        assert!(NxWorkspace.workspace_patterns(&fs, root()).is_err());
    }

    #[test]
    fn test_lerna_default_packages() {
        let fs = MockFileSystem::new();
        fs.add_file("lerna.json", r#"{"version": "independent"}"#);

        let patterns = LernaWorkspace.workspace_patterns(&fs, root()).unwrap();
        assert_eq!(patterns, vec!["packages/*"]);
    }
}
