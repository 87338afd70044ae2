//! Maven multi-module and Gradle multi-project builds

use super::{WorkspaceManager, WorkspaceManagerId};
use crate::error::ParseError;
use crate::extractors::parsers::read_optional;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub struct MavenReactor;

impl WorkspaceManager for MavenReactor {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Maven
    }

    fn marker_files(&self) -> &[&str] {
        &["pom.xml"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let path = root.join("pom.xml");
        let Some(content) = read_optional(fs, &path)? else {
            return Ok(Vec::new());
        };
        let doc = roxmltree::Document::parse(&content)
            .map_err(|e| ParseError::new(&path, e.to_string()))?;

        // Only the top-level <modules>; profiles may declare their own
        let modules = doc
            .root_element()
            .children()
            .filter(|n| n.tag_name().name() == "modules")
            .flat_map(|modules| modules.children())
            .filter(|n| n.tag_name().name() == "module")
            .filter_map(|n| n.text())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        Ok(modules)
    }
}

pub struct GradleMultiProject;

const SETTINGS_FILES: &[&str] = &["settings.gradle", "settings.gradle.kts"];

impl WorkspaceManager for GradleMultiProject {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Gradle
    }

    fn marker_files(&self) -> &[&str] {
        SETTINGS_FILES
    }

    fn is_present(&self, fs: &dyn FileSystem, root: &Path) -> bool {
        fs.find_first(root, SETTINGS_FILES).is_some()
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let Some(path) = fs.find_first(root, SETTINGS_FILES) else {
            return Ok(Vec::new());
        };
        Ok(read_optional(fs, &path)?
            .map(|content| parse_includes(&content))
            .unwrap_or_default())
    }
}

/// Project paths from `include 'a', ':libs:core'` and `include("a")` statements
fn parse_includes(content: &str) -> Vec<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let quoted = QUOTED.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid regex"));

    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("include"))
        .flat_map(|line| {
            quoted
                .captures_iter(line)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().trim_start_matches(':').replace(':', "/"))
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_maven_modules() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "pom.xml",
            r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modules>
    <module>api</module>
    <module> worker </module>
  </modules>
</project>"#,
        );

        let modules = MavenReactor
            .workspace_patterns(&fs, Path::new("/mock"))
            .unwrap();
        assert_eq!(modules, vec!["api", "worker"]);
    }

    #[test]
    fn test_maven_invalid_xml() {
        let fs = MockFileSystem::new();
        fs.add_file("pom.xml", "<project><modules></project>");

        assert!(MavenReactor
            .workspace_patterns(&fs, Path::new("/mock"))
            .is_err());
    }

    #[test]
    fn test_gradle_includes() {
        let content = r#"
rootProject.name = "shop"
include 'app', ':libs:core'
include("services:billing")
"#;
        assert_eq!(
            parse_includes(content),
            vec!["app", "libs/core", "services/billing"]
        );
    }

    #[test]
    fn test_gradle_kts_presence() {
        let fs = MockFileSystem::new();
        fs.add_file("settings.gradle.kts", "include(\"app\")");
        assert!(GradleMultiProject.is_present(&fs, Path::new("/mock")));
    }
}
