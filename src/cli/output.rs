//! Output formatting for analysis and provisioning results
//!
//! JSON and YAML are straight serde dumps of the result types. The human format is
//! a tree view meant for terminals.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::detection::types::{AnalysisResult, DetectedApp};
use crate::provision::ProvisioningResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (version-control friendly)
    Yaml,
    /// Human-readable tree
    Human,
}

const BRANCH: &str = "\u{251C}\u{2500}";
const LAST: &str = "\u{2514}\u{2500}";

fn rule() -> String {
    "\u{2501}".repeat(42)
}

fn connector(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        LAST
    } else {
        BRANCH
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_analysis(&self, result: &AnalysisResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Yaml => to_yaml(result),
            OutputFormat::Human => Ok(analysis_human(result)),
        }
    }

    pub fn format_provisioning(&self, result: &ProvisioningResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Yaml => to_yaml(result),
            OutputFormat::Human => Ok(provisioning_human(result)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result to JSON")
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize result to YAML")
}

fn app_line(app: &DetectedApp) -> String {
    let mut line = format!(
        "{} ({}) {} / {} / port {}",
        app.name, app.path, app.framework, app.build_pack, app.default_port
    );
    if let Some(build) = &app.build_command {
        line.push_str(&format!(" / build: {}", build));
    }
    line
}

fn analysis_human(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str("\u{2713} Repository Analysis\n");
    output.push_str(&rule());
    output.push_str("\n\n");

    match (&result.monorepo.workspace_type, result.monorepo.is_monorepo) {
        (Some(kind), true) => output.push_str(&format!(
            "Layout:  monorepo ({}, {} workspaces)\n\n",
            kind,
            result.monorepo.workspace_paths.len()
        )),
        _ => output.push_str("Layout:  single application\n\n"),
    }

    output.push_str("Applications:\n");
    for (i, app) in result.applications.iter().enumerate() {
        output.push_str(&format!(
            "{} {}\n",
            connector(i, result.applications.len()),
            app_line(app)
        ));
    }
    output.push('\n');

    output.push_str("Databases:\n");
    if result.databases.is_empty() {
        output.push_str(&format!("{} (none)\n", LAST));
    }
    for (i, db) in result.databases.iter().enumerate() {
        output.push_str(&format!(
            "{} {} [{}] {} used by {}\n",
            connector(i, result.databases.len()),
            db.name,
            db.db_type,
            db.env_var_name,
            db.consumers.join(", ")
        ));
    }
    output.push('\n');

    if !result.services.is_empty() {
        output.push_str("Services:\n");
        for (i, service) in result.services.iter().enumerate() {
            output.push_str(&format!(
                "{} {}: {} ({})\n",
                connector(i, result.services.len()),
                service.service_type,
                service.description,
                service.required_env_vars.join(", ")
            ));
        }
        output.push('\n');
    }

    if !result.env_variables.is_empty() {
        output.push_str("Environment Variables:\n");
        for (i, var) in result.env_variables.iter().enumerate() {
            let value = match (&var.default_value, var.is_required) {
                (Some(value), _) => format!("= {}", value),
                (None, true) => "(required)".to_string(),
                (None, false) => String::new(),
            };
            output.push_str(&format!(
                "{} {}.{} {} [{}]\n",
                connector(i, result.env_variables.len()),
                var.for_app,
                var.key,
                value,
                var.category
            ));
        }
        output.push('\n');
    }

    if !result.persistent_volumes.is_empty() {
        output.push_str("Persistent Volumes:\n");
        for (i, volume) in result.persistent_volumes.iter().enumerate() {
            output.push_str(&format!(
                "{} {} at {} ({})\n",
                connector(i, result.persistent_volumes.len()),
                volume.name,
                volume.mount_path,
                volume.reason
            ));
        }
    }

    output
}

fn provisioning_human(result: &ProvisioningResult) -> String {
    let mut output = String::new();

    output.push_str("\u{2713} Provisioning Preview\n");
    output.push_str(&rule());
    output.push_str("\n\n");

    if let Some(group) = &result.monorepo_group_id {
        output.push_str(&format!("Monorepo group: {}\n\n", group));
    }

    output.push_str("Databases:\n");
    if result.databases.is_empty() {
        output.push_str(&format!("{} (none)\n", LAST));
    }
    for (i, (key, db)) in result.databases.iter().enumerate() {
        output.push_str(&format!(
            "{} {} ({})\n",
            connector(i, result.databases.len()),
            db.name,
            key
        ));
    }
    output.push('\n');

    output.push_str("Applications:\n");
    for (i, app) in result.applications.values().enumerate() {
        output.push_str(&format!(
            "{} {} at {}\n",
            connector(i, result.applications.len()),
            app.name,
            app.fqdn
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Links: {}  Environment variables: {}\n",
        result.links.len(),
        result.env_variables
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{AppType, BuildPack, DetectedDatabase, MonorepoInfo};
    use crate::stack::{DatabaseType, FrameworkId};
    use std::collections::BTreeMap;

    fn create_test_result() -> AnalysisResult {
        AnalysisResult {
            monorepo: MonorepoInfo::not_monorepo(),
            applications: vec![DetectedApp {
                name: "shop".to_string(),
                path: ".".to_string(),
                framework: FrameworkId::Express,
                build_pack: BuildPack::Nixpacks,
                default_port: 3000,
                install_command: None,
                build_command: None,
                publish_directory: None,
                app_type: AppType::Backend,
            }],
            databases: vec![DetectedDatabase::new(DatabaseType::Postgresql, "db")
                .with_consumer("shop")],
            services: vec![],
            env_variables: vec![],
            persistent_volumes: vec![],
            health_checks: BTreeMap::new(),
        }
    }

    #[test]
    fn test_json_format() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_analysis(&create_test_result())
            .unwrap();

        assert!(output.contains("\"envVarName\": \"DATABASE_URL\""));
        let parsed: AnalysisResult = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, create_test_result());
    }

    #[test]
    fn test_yaml_format() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_analysis(&create_test_result())
            .unwrap();

        assert!(output.contains("isMonorepo: false"));
        let parsed: AnalysisResult = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed.applications[0].name, "shop");
    }

    #[test]
    fn test_human_format() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_analysis(&create_test_result())
            .unwrap();

        assert!(output.contains("Layout:  single application"));
        assert!(output.contains("shop (.) express / nixpacks / port 3000"));
        assert!(output.contains("db [postgresql] DATABASE_URL used by shop"));
    }
}
