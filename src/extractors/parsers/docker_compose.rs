//! Docker Compose file parsing utilities

use super::dockerfile::exec_form_to_shell;
use super::{http_path_from_command, read_optional};
use crate::detection::types::{DetectedHealthCheck, DockerComposeService};
use crate::error::ParseError;
use crate::fs::FileSystem;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

pub fn find_compose_file(fs: &dyn FileSystem, dir: &Path) -> Option<PathBuf> {
    fs.find_first(dir, COMPOSE_FILES)
}

/// Parse the compose file in `dir` if present
pub fn read_compose(
    fs: &dyn FileSystem,
    dir: &Path,
) -> Result<Option<Vec<DockerComposeService>>, ParseError> {
    let Some(path) = find_compose_file(fs, dir) else {
        return Ok(None);
    };
    read_optional(fs, &path)?
        .map(|content| parse_compose(&path, &content))
        .transpose()
}

pub fn parse_compose(path: &Path, content: &str) -> Result<Vec<DockerComposeService>, ParseError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value =
        serde_yaml::from_str(content).map_err(|e| ParseError::new(path, e.to_string()))?;
    let Some(root) = document.as_mapping() else {
        return Err(ParseError::new(path, "expected a mapping at the top level"));
    };

    let services = match root.get("services") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(services)) => services,
        Some(_) => return Err(ParseError::new(path, "'services' must be a mapping")),
    };

    services
        .iter()
        .map(|(name, definition)| {
            let name = scalar(name)
                .ok_or_else(|| ParseError::new(path, "service name must be a string"))?;
            let empty = Mapping::new();
            let definition = match definition {
                Value::Mapping(m) => m,
                Value::Null => &empty,
                _ => {
                    return Err(ParseError::new(
                        path,
                        format!("service '{}' must be a mapping", name),
                    ))
                }
            };
            Ok(parse_service(name, definition))
        })
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_sequence())
        .map(|items| items.iter().filter_map(scalar).collect())
        .unwrap_or_default()
}

fn parse_service(name: String, definition: &Mapping) -> DockerComposeService {
    DockerComposeService {
        image: definition.get("image").and_then(scalar),
        ports: parse_ports(definition.get("ports")),
        environment: parse_environment(definition.get("environment")),
        volumes: parse_volumes(definition.get("volumes")),
        depends_on: match definition.get("depends_on") {
            Some(Value::Mapping(m)) => m.keys().filter_map(scalar).collect(),
            other => string_list(other),
        },
        healthcheck: definition
            .get("healthcheck")
            .and_then(|v| v.as_mapping())
            .and_then(parse_healthcheck),
        name,
    }
}

fn parse_ports(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(|v| v.as_sequence()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Mapping(long) => {
                let target = long.get("target").and_then(scalar)?;
                Some(match long.get("published").and_then(scalar) {
                    Some(published) => format!("{}:{}", published, target),
                    None => target,
                })
            }
            other => scalar(other),
        })
        .collect()
}

fn parse_volumes(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(|v| v.as_sequence()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Mapping(long) => {
                let target = long.get("target").and_then(scalar)?;
                Some(match long.get("source").and_then(scalar) {
                    Some(source) => format!("{}:{}", source, target),
                    None => target,
                })
            }
            other => scalar(other),
        })
        .collect()
}

/// Interpolated values (`${VAR}`) are not usable defaults
fn literal_value(value: String) -> Option<String> {
    (!value.contains("${")).then_some(value)
}

fn parse_environment(value: Option<&Value>) -> BTreeMap<String, Option<String>> {
    let mut environment = BTreeMap::new();

    match value {
        Some(Value::Sequence(items)) => {
            for item in items.iter().filter_map(scalar) {
                match item.split_once('=') {
                    Some((key, value)) => {
                        environment.insert(key.trim().to_string(), literal_value(value.to_string()))
                    }
                    None => environment.insert(item.trim().to_string(), None),
                };
            }
        }
        Some(Value::Mapping(map)) => {
            for (key, value) in map {
                if let Some(key) = scalar(key) {
                    environment.insert(key, scalar(value).and_then(literal_value));
                }
            }
        }
        _ => {}
    }

    environment
}

fn parse_healthcheck(definition: &Mapping) -> Option<DetectedHealthCheck> {
    if definition.get("disable").and_then(|v| v.as_bool()) == Some(true) {
        return None;
    }

    let command = match definition.get("test") {
        Some(Value::Sequence(parts)) => {
            let parts: Vec<String> = parts.iter().filter_map(scalar).collect();
            match parts.first().map(String::as_str) {
                Some("NONE") => return None,
                Some("CMD") | Some("CMD-SHELL") => Some(parts[1..].join(" ")),
                _ => Some(parts.join(" ")),
            }
        }
        Some(Value::String(s)) => Some(exec_form_to_shell(s)),
        _ => None,
    };

    Some(DetectedHealthCheck {
        path: command.as_deref().and_then(http_path_from_command),
        command,
        interval: definition.get("interval").and_then(scalar),
        timeout: definition.get("timeout").and_then(scalar),
        retries: definition
            .get("retries")
            .and_then(|v| v.as_u64())
            .and_then(|r| u32::try_from(r).ok()),
        source: "docker-compose".to_string(),
    })
}
