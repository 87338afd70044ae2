//! Go workspaces (`go.work`)

use super::{WorkspaceManager, WorkspaceManagerId};
use crate::error::ParseError;
use crate::extractors::parsers::read_optional;
use crate::fs::FileSystem;
use std::path::Path;

pub struct GoWorkspace;

impl WorkspaceManager for GoWorkspace {
    fn id(&self) -> WorkspaceManagerId {
        WorkspaceManagerId::Go
    }

    fn marker_files(&self) -> &[&str] {
        &["go.work"]
    }

    fn workspace_patterns(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<Vec<String>, ParseError> {
        let path = root.join("go.work");
        Ok(read_optional(fs, &path)?
            .map(|content| parse_use_directives(&content))
            .unwrap_or_default())
    }
}

/// `use ./api` and `use ( ./a ./b )` blocks
fn parse_use_directives(content: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else {
                paths.push(unquote(line));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("use") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                let inner = rest.trim_start_matches('(').trim();
                if inner.ends_with(')') {
                    paths.extend(inner.trim_end_matches(')').split_whitespace().map(unquote));
                } else {
                    in_block = true;
                    if !inner.is_empty() {
                        paths.push(unquote(inner));
                    }
                }
            } else if !rest.is_empty() {
                paths.push(unquote(rest));
            }
        }
    }

    paths
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}
