use crate::stack::{DatabaseType, FrameworkId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Workspace layout of a checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonorepoInfo {
    pub is_monorepo: bool,
    /// Workspace manager id (`pnpm`, `turborepo`, `cargo`, ...)
    #[serde(rename = "type")]
    pub workspace_type: Option<String>,
    /// Workspace directories relative to the checkout root, sorted
    pub workspace_paths: Vec<String>,
}

impl MonorepoInfo {
    pub fn not_monorepo() -> Self {
        Self {
            is_monorepo: false,
            workspace_type: None,
            workspace_paths: Vec::new(),
        }
    }

    pub fn new(workspace_type: impl Into<String>, workspace_paths: Vec<String>) -> Self {
        Self {
            is_monorepo: true,
            workspace_type: Some(workspace_type.into()),
            workspace_paths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPack {
    Nixpacks,
    Dockerfile,
    DockerCompose,
    Static,
}

impl fmt::Display for BuildPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildPack::Nixpacks => "nixpacks",
            BuildPack::Dockerfile => "dockerfile",
            BuildPack::DockerCompose => "dockercompose",
            BuildPack::Static => "static",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Backend,
    Frontend,
    Fullstack,
    Unknown,
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppType::Backend => "backend",
            AppType::Frontend => "frontend",
            AppType::Fullstack => "fullstack",
            AppType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// One deployable application inside the checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedApp {
    pub name: String,
    /// Relative to the checkout root; `"."` is the root itself
    pub path: String,
    pub framework: FrameworkId,
    pub build_pack: BuildPack,
    pub default_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_directory: Option<String>,
    #[serde(rename = "type")]
    pub app_type: AppType,
}

impl DetectedApp {
    pub fn is_root(&self) -> bool {
        self.path == "."
    }
}

/// A database the checkout needs, possibly shared by several apps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedDatabase {
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    pub name: String,
    pub env_var_name: String,
    /// App names, unique and in first-seen order
    pub consumers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_via: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl DetectedDatabase {
    pub fn new(db_type: DatabaseType, name: impl Into<String>) -> Self {
        Self {
            env_var_name: db_type.default_env_var_name(),
            db_type,
            name: name.into(),
            consumers: Vec::new(),
            detected_via: None,
            port: None,
        }
    }

    pub fn with_env_var_name(mut self, env_var_name: impl Into<String>) -> Self {
        self.env_var_name = env_var_name.into();
        self
    }

    pub fn with_consumer(self, consumer: impl Into<String>) -> Self {
        self.with_merged_consumers(&[consumer.into()])
    }

    pub fn with_detected_via(mut self, detected_via: impl Into<String>) -> Self {
        self.detected_via = Some(detected_via.into());
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// New instance whose consumers are the ordered union with `consumers`
    pub fn with_merged_consumers(&self, consumers: &[String]) -> Self {
        let mut merged = self.clone();
        for consumer in consumers {
            if !merged.consumers.contains(consumer) {
                merged.consumers.push(consumer.clone());
            }
        }
        merged
    }

    /// Deduplication key
    pub fn key(&self) -> (DatabaseType, String) {
        (self.db_type.clone(), self.name.clone())
    }
}

/// A third-party service inferred from variable naming conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedService {
    #[serde(rename = "type")]
    pub service_type: String,
    pub description: String,
    pub required_env_vars: Vec<String>,
    pub consumers: Vec<String>,
}

impl DetectedService {
    /// Union of env vars and consumers, keeping `self`'s type and description
    pub fn with_merged(&self, other: &DetectedService) -> Self {
        let mut merged = self.clone();
        for key in &other.required_env_vars {
            if !merged.required_env_vars.contains(key) {
                merged.required_env_vars.push(key.clone());
            }
        }
        for consumer in &other.consumers {
            if !merged.consumers.contains(consumer) {
                merged.consumers.push(consumer.clone());
            }
        }
        merged
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvCategory {
    Database,
    Cache,
    Secret,
    Other,
}

impl fmt::Display for EnvCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnvCategory::Database => "database",
            EnvCategory::Cache => "cache",
            EnvCategory::Secret => "secret",
            EnvCategory::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEnvVariable {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub is_required: bool,
    pub category: EnvCategory,
    pub for_app: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedHealthCheck {
    /// HTTP path probed by the check, when one could be read off the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// `dockerfile` or `docker-compose`
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPersistentVolume {
    pub name: String,
    pub mount_path: String,
    pub reason: String,
    pub for_app: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    Pypi,
    Composer,
    Rubygems,
    Go,
    Cargo,
    Maven,
    Hex,
}

/// A declared package dependency read from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub ecosystem: Ecosystem,
}

impl AppDependency {
    pub fn new(name: impl Into<String>, version: Option<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            version,
            ecosystem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CIConfig {
    /// `github` or `gitlab`
    pub provider: String,
    pub files: Vec<String>,
    pub service_images: Vec<String>,
    pub env_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerComposeService {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub ports: Vec<String>,
    /// Declared variables; `None` when only the key is listed or the value is an interpolation
    pub environment: BTreeMap<String, Option<String>>,
    pub volumes: Vec<String>,
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<DetectedHealthCheck>,
}

impl DockerComposeService {
    /// Container port of the first mapping (`"5433:5432"` → 5432)
    pub fn container_port(&self) -> Option<u16> {
        self.ports.iter().find_map(|mapping| {
            let without_proto = mapping.split('/').next().unwrap_or(mapping);
            without_proto.rsplit(':').next()?.trim().parse().ok()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    pub exposed_ports: Vec<u16>,
    pub build_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<DetectedHealthCheck>,
}

/// Everything found for a single app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAnalysisResult {
    pub databases: Vec<DetectedDatabase>,
    pub services: Vec<DetectedService>,
    pub env_variables: Vec<DetectedEnvVariable>,
    pub health_checks: Vec<DetectedHealthCheck>,
    pub persistent_volumes: Vec<DetectedPersistentVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<DockerfileInfo>,
    pub ci: Vec<CIConfig>,
}

/// Result of analyzing one checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub monorepo: MonorepoInfo,
    pub applications: Vec<DetectedApp>,
    pub databases: Vec<DetectedDatabase>,
    pub services: Vec<DetectedService>,
    pub env_variables: Vec<DetectedEnvVariable>,
    #[serde(default)]
    pub persistent_volumes: Vec<DetectedPersistentVolume>,
    /// Health checks per app name
    #[serde(default)]
    pub health_checks: BTreeMap<String, Vec<DetectedHealthCheck>>,
}

impl AnalysisResult {
    pub fn application(&self, name: &str) -> Option<&DetectedApp> {
        self.applications.iter().find(|app| app.name == name)
    }

    pub fn env_variables_for<'a>(
        &'a self,
        app_name: &'a str,
    ) -> impl Iterator<Item = &'a DetectedEnvVariable> + 'a {
        self.env_variables
            .iter()
            .filter(move |var| var.for_app == app_name)
    }
}
