// Shared file format parsers
//
// Each parser reads through the FileSystem trait so detection runs the same against a
// real checkout and MockFileSystem.

pub mod ci;
pub mod docker_compose;
pub mod dockerfile;
pub mod env_file;
pub mod manifest;

use crate::error::ParseError;
use crate::fs::FileSystem;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Read a file that may be absent, mapping I/O failures to [`ParseError`]
pub fn read_optional(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>, ParseError> {
    fs.read_optional(path)
        .map_err(|e| ParseError::unreadable(path, &e))
}

/// HTTP path probed by a health-check command that curls or wgets a URL
pub fn http_path_from_command(command: &str) -> Option<String> {
    static URL_PATH: OnceLock<Regex> = OnceLock::new();
    let re = URL_PATH.get_or_init(|| {
        Regex::new(r#"https?://[^/\s"'$]+(?:\$\{?\w+\}?)?(/[^\s"'|;&]*)?"#).expect("valid regex")
    });

    if !(command.contains("curl") || command.contains("wget")) {
        return None;
    }

    re.captures(command).map(|cap| {
        cap.get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    })
}
