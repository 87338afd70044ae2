use crate::detection::types::BuildPack;
use crate::stack::DatabaseType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the application source is pulled from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitConfig {
    pub repository_url: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl GitConfig {
    pub fn new(repository_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
            branch: branch.into(),
            commit: None,
        }
    }
}

/// Deployment environment the resources are created in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A resolved deployment destination (server plus network)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    pub server_id: String,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDatabase {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    pub image: String,
    pub port: u16,
    pub credentials: DatabaseCredentials,
    pub internal_url: String,
    pub environment_id: String,
    pub destination_id: String,
}

/// Volume to attach so file-based storage survives redeploys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeHint {
    pub name: String,
    pub mount_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub name: String,
    pub git: GitConfig,
    pub destination: Destination,
    pub environment_id: String,
    pub build_pack: BuildPack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_directory: Option<String>,
    /// `""` for the checkout root, otherwise `/`-prefixed
    pub base_directory: String,
    pub ports_exposes: u16,
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monorepo_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_path: Option<String>,
    #[serde(default)]
    pub volumes: Vec<VolumeHint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceLink {
    pub database_id: String,
    pub application_id: String,
    pub env_var_name: String,
    pub auto_inject: bool,
    pub use_internal_address: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnvVariable {
    pub application_id: String,
    pub key: String,
    pub value: String,
    /// True when `value` is the required-variable placeholder
    pub is_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHandle {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    pub internal_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationHandle {
    pub id: String,
    pub name: String,
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monorepo_group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLinkHandle {
    pub id: String,
    pub database_id: String,
    pub application_id: String,
    pub env_var_name: String,
}

/// Everything created by one committed provisioning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResult {
    /// Keyed by app name
    pub applications: BTreeMap<String, ApplicationHandle>,
    /// Keyed by database type id; additional databases of the same type use `type:name`
    pub databases: BTreeMap<String, DatabaseHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monorepo_group_id: Option<String>,
    pub links: Vec<ResourceLinkHandle>,
    /// Number of variables written
    pub env_variables: usize,
    pub provisioned_at: DateTime<Utc>,
}
