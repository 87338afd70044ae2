//! .env example file parsing utilities

use super::read_optional;
use crate::error::ParseError;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub const ENV_EXAMPLE_FILES: &[&str] = &[".env.example", ".env.sample", ".env.template", ".env.dist"];

/// One `KEY=value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: String,
    /// `None` when the value is a placeholder or empty
    pub default_value: Option<String>,
    pub required: bool,
    pub line: usize,
}

/// Parse every env example file in `dir`; the first declaration of a key wins
pub fn read_env_examples(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<EnvEntry>, ParseError> {
    let mut entries: Vec<EnvEntry> = Vec::new();

    for file in ENV_EXAMPLE_FILES {
        let path = dir.join(file);
        let Some(content) = read_optional(fs, &path)? else {
            continue;
        };
        for entry in parse_env_example(&path, &content)? {
            if !entries.iter().any(|e| e.key == entry.key) {
                entries.push(entry);
            }
        }
    }

    Ok(entries)
}

pub fn parse_env_example(path: &Path, content: &str) -> Result<Vec<EnvEntry>, ParseError> {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let re = LINE.get_or_init(|| {
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(.*)$").expect("valid regex")
    });

    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(cap) = re.captures(line) else {
            return Err(ParseError::new(
                path,
                format!("line {}: expected KEY=value, got '{}'", index + 1, line),
            ));
        };

        let key = cap.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
        let value = clean_value(cap.get(2).map(|m| m.as_str()).unwrap_or_default());
        let required = is_placeholder(&value);

        entries.push(EnvEntry {
            key,
            default_value: (!required).then_some(value),
            required,
            line: index + 1,
        });
    }

    Ok(entries)
}

/// Strip quotes, or a trailing ` # comment` from unquoted values
fn clean_value(raw: &str) -> String {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) {
            if let Some(end) = raw[1..].find(quote) {
                return raw[1..1 + end].to_string();
            }
        }
    }
    raw.split(" #").next().unwrap_or(raw).trim().to_string()
}

fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed == "REQUIRED"
        || trimmed == "TODO"
        || trimmed.eq_ignore_ascii_case("changeme")
        || (trimmed.starts_with('<') && trimmed.ends_with('>'))
}
