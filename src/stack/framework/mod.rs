//! Framework signature table
//!
//! Detection is deterministic: each [`FrameworkSignature`] row names the manifest that
//! must exist and the dependency patterns that identify the framework. Rows are tried
//! in order and the first match wins, so the default table lists meta frameworks first,
//! then server libraries, then one generic row per language.

use crate::detection::types::{AppDependency, AppType, Ecosystem};
use crate::fs::FileSystem;
use crate::stack::FrameworkId;
use std::path::Path;

pub mod elixir;
pub mod go;
pub mod jvm;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

/// Type of dependency pattern matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyPatternType {
    /// Package name equals the pattern (e.g. `express`)
    Exact,
    /// Package name starts with the pattern (e.g. `@remix-run/`)
    Prefix,
    /// Package name contains the pattern; used for Maven `group:artifact` coordinates
    Contains,
}

/// Dependency pattern for framework detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPattern {
    pub ecosystem: Ecosystem,
    pub pattern_type: DependencyPatternType,
    pub pattern: String,
}

impl DependencyPattern {
    pub fn exact(ecosystem: Ecosystem, pattern: &str) -> Self {
        Self::new(ecosystem, DependencyPatternType::Exact, pattern)
    }

    pub fn prefix(ecosystem: Ecosystem, pattern: &str) -> Self {
        Self::new(ecosystem, DependencyPatternType::Prefix, pattern)
    }

    pub fn contains(ecosystem: Ecosystem, pattern: &str) -> Self {
        Self::new(ecosystem, DependencyPatternType::Contains, pattern)
    }

    fn new(ecosystem: Ecosystem, pattern_type: DependencyPatternType, pattern: &str) -> Self {
        Self {
            ecosystem,
            pattern_type,
            pattern: pattern.to_string(),
        }
    }

    /// Check if a dependency matches this pattern
    pub fn matches(&self, dep: &AppDependency) -> bool {
        if dep.ecosystem != self.ecosystem {
            return false;
        }

        // PyPI and Composer names are case-insensitive
        let name = dep.name.to_lowercase();
        let pattern = self.pattern.to_lowercase();

        match self.pattern_type {
            DependencyPatternType::Exact => name == pattern,
            DependencyPatternType::Prefix => name.starts_with(&pattern),
            DependencyPatternType::Contains => name.contains(&pattern),
        }
    }
}

/// One row of the framework table
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkSignature {
    pub framework: FrameworkId,
    /// At least one of these must exist in the app directory
    pub manifests: Vec<String>,
    /// Any one pattern matching is enough; an empty list matches on the manifest alone
    pub patterns: Vec<DependencyPattern>,
    pub default_port: u16,
    pub app_type: AppType,
    pub build_command: Option<String>,
    pub publish_directory: Option<String>,
    /// Build produces static assets that can be served without a runtime
    pub static_output: bool,
}

impl FrameworkSignature {
    pub fn new(framework: FrameworkId, manifests: &[&str], default_port: u16, app_type: AppType) -> Self {
        Self {
            framework,
            manifests: manifests.iter().map(|m| m.to_string()).collect(),
            patterns: Vec::new(),
            default_port,
            app_type,
            build_command: None,
            publish_directory: None,
            static_output: false,
        }
    }

    pub fn with_pattern(mut self, pattern: DependencyPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn with_build(mut self, build_command: &str) -> Self {
        self.build_command = Some(build_command.to_string());
        self
    }

    /// Mark the row as producing static output served from `publish_directory`
    pub fn with_static_output(mut self, publish_directory: &str) -> Self {
        self.publish_directory = Some(publish_directory.to_string());
        self.static_output = true;
        self
    }

    pub fn manifest_present(&self, fs: &dyn FileSystem, dir: &Path) -> bool {
        self.manifests.iter().any(|m| fs.is_file(&dir.join(m)))
    }

    pub fn matches(&self, fs: &dyn FileSystem, dir: &Path, deps: &[AppDependency]) -> bool {
        if !self.manifest_present(fs, dir) {
            return false;
        }
        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|pattern| deps.iter().any(|dep| pattern.matches(dep)))
    }
}

/// Framework rows of every ecosystem followed by the generic language rows
pub fn default_signatures() -> Vec<FrameworkSignature> {
    let mut signatures = Vec::new();

    signatures.extend(node::frameworks());
    signatures.extend(python::frameworks());
    signatures.extend(php::frameworks());
    signatures.extend(ruby::frameworks());
    signatures.extend(go::frameworks());
    signatures.extend(rust::frameworks());
    signatures.extend(jvm::frameworks());
    signatures.extend(elixir::frameworks());

    // package.json often sits next to another language's manifest for asset tooling,
    // so the Node.js fallback goes last
    signatures.push(python::generic());
    signatures.push(php::generic());
    signatures.push(ruby::generic());
    signatures.push(go::generic());
    signatures.push(rust::generic());
    signatures.push(jvm::generic());
    signatures.push(elixir::generic());
    signatures.push(node::generic());

    signatures
}
