//! Dockerfile parsing utilities

use super::{http_path_from_command, read_optional};
use crate::detection::types::{DetectedHealthCheck, DockerfileInfo};
use crate::error::ParseError;
use crate::fs::FileSystem;
use crate::stack::database::{image_repository, image_tag};
use std::collections::HashSet;
use std::path::Path;

/// Base image name → runtime id
const RUNTIME_IMAGES: &[(&str, &str)] = &[
    ("node", "node"),
    ("bun", "bun"),
    ("deno", "deno"),
    ("python", "python"),
    ("golang", "go"),
    ("ruby", "ruby"),
    ("php", "php"),
    ("rust", "rust"),
    ("openjdk", "java"),
    ("eclipse-temurin", "java"),
    ("amazoncorretto", "java"),
    ("elixir", "elixir"),
    ("nginx", "nginx"),
];

/// Parse `Dockerfile` in `dir` if present
pub fn read_dockerfile(
    fs: &dyn FileSystem,
    dir: &Path,
) -> Result<Option<DockerfileInfo>, ParseError> {
    let path = dir.join("Dockerfile");
    read_optional(fs, &path)?
        .map(|content| parse_dockerfile(&path, &content))
        .transpose()
}

/// Logical instructions: comments dropped, `\` continuations joined
fn instructions(content: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut pending = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if pending.is_empty() && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }

        if let Some(continued) = trimmed.strip_suffix('\\') {
            pending.push_str(continued);
            pending.push(' ');
            continue;
        }
        pending.push_str(trimmed);

        let logical = std::mem::take(&mut pending);
        let mut parts = logical.splitn(2, char::is_whitespace);
        let keyword = parts.next().unwrap_or("").to_uppercase();
        let args = parts.next().unwrap_or("").trim().to_string();
        result.push((keyword, args));
    }

    if !pending.trim().is_empty() {
        let mut parts = pending.trim().splitn(2, char::is_whitespace);
        let keyword = parts.next().unwrap_or("").to_uppercase();
        let args = parts.next().unwrap_or("").trim().to_string();
        result.push((keyword, args));
    }

    result
}

pub fn parse_dockerfile(path: &Path, content: &str) -> Result<DockerfileInfo, ParseError> {
    let mut info = DockerfileInfo::default();
    let mut stage_names: HashSet<String> = HashSet::new();
    let mut saw_from = false;

    let instructions = instructions(content);
    if instructions.is_empty() {
        return Ok(info);
    }

    for (keyword, args) in instructions {
        match keyword.as_str() {
            "FROM" => {
                saw_from = true;
                let tokens: Vec<&str> = args
                    .split_whitespace()
                    .filter(|t| !t.starts_with("--"))
                    .collect();
                let Some(image) = tokens.first() else {
                    return Err(ParseError::new(path, "FROM without an image"));
                };
                if let (Some(as_kw), Some(alias)) = (tokens.get(1), tokens.get(2)) {
                    if as_kw.eq_ignore_ascii_case("as") {
                        stage_names.insert(alias.to_lowercase());
                    }
                }
                // `FROM builder` reuses an earlier stage; keep the image it was built from
                if !stage_names.contains(&image.to_lowercase()) || info.base_image.is_none() {
                    apply_base_image(&mut info, image);
                }
            }
            "EXPOSE" => {
                for token in args.split_whitespace() {
                    let port = token.split('/').next().unwrap_or(token);
                    if port.starts_with('$') {
                        continue;
                    }
                    let port = parse_expose_port(port).ok_or_else(|| {
                        ParseError::new(path, format!("invalid EXPOSE port '{}'", token))
                    })?;
                    if !info.exposed_ports.contains(&port) {
                        info.exposed_ports.push(port);
                    }
                }
            }
            "ARG" => {
                let name = args.split('=').next().unwrap_or("").trim();
                if !name.is_empty() && !info.build_args.iter().any(|a| a == name) {
                    info.build_args.push(name.to_string());
                }
            }
            "HEALTHCHECK" => {
                info.healthcheck = parse_healthcheck(&args);
            }
            _ => {}
        }
    }

    if !saw_from {
        return Err(ParseError::new(path, "missing FROM instruction"));
    }

    Ok(info)
}

fn apply_base_image(info: &mut DockerfileInfo, image: &str) {
    let repository = image_repository(image);
    let tag = image_tag(image);
    let short_name = repository.rsplit('/').next().unwrap_or(repository);

    info.base_image = Some(repository.to_string());
    info.base_image_version = tag.map(String::from);
    info.runtime = RUNTIME_IMAGES
        .iter()
        .find(|(image, _)| *image == short_name)
        .map(|(_, runtime)| runtime.to_string());
    info.runtime_version = info.runtime.as_ref().and(tag).and_then(|tag| {
        let version: String = tag
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let version = version.trim_end_matches('.').to_string();
        (!version.is_empty()).then_some(version)
    });
}

/// `HEALTHCHECK [--interval=..] [--timeout=..] [--retries=..] CMD ...`
fn parse_healthcheck(args: &str) -> Option<DetectedHealthCheck> {
    if args.trim().eq_ignore_ascii_case("none") {
        return None;
    }

    let mut check = DetectedHealthCheck {
        path: None,
        command: None,
        interval: None,
        timeout: None,
        retries: None,
        source: "dockerfile".to_string(),
    };

    let mut rest = args.trim();
    while let Some(option) = rest.strip_prefix("--") {
        let (flag, remaining) = option.split_once(char::is_whitespace).unwrap_or((option, ""));
        if let Some((key, value)) = flag.split_once('=') {
            match key {
                "interval" => check.interval = Some(value.to_string()),
                "timeout" => check.timeout = Some(value.to_string()),
                "retries" => check.retries = value.parse().ok(),
                _ => {}
            }
        }
        rest = remaining.trim_start();
    }

    let command = rest
        .strip_prefix("CMD")
        .or_else(|| rest.strip_prefix("cmd"))
        .unwrap_or(rest)
        .trim();
    let command = exec_form_to_shell(command);

    if !command.is_empty() {
        check.path = http_path_from_command(&command);
        check.command = Some(command);
    }
    Some(check)
}

/// `["curl", "-f", "http://x"]` → `curl -f http://x`
pub fn exec_form_to_shell(command: &str) -> String {
    match serde_json::from_str::<Vec<String>>(command) {
        Ok(parts) => parts.join(" "),
        Err(_) => command.to_string(),
    }
}

/// `8080` or a `9229-9230` range; a range records its low end
fn parse_expose_port(port: &str) -> Option<u16> {
    match port.split_once('-') {
        Some((low, high)) => {
            let low: u16 = low.parse().ok()?;
            let high: u16 = high.parse().ok()?;
            (low <= high).then_some(low)
        }
        None => port.parse().ok(),
    }
}
