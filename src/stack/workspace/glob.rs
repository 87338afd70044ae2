//! Workspace glob resolution over a [`FileSystem`]
//!
//! Supports the subset of glob syntax workspace manifests use in practice: `*` and `?`
//! inside a path segment, `**` spanning up to [`MAX_GLOBSTAR_DEPTH`] directories and
//! `!`-prefixed exclusions.

use crate::fs::FileSystem;
use std::collections::BTreeSet;
use std::path::Path;

pub const MAX_GLOBSTAR_DEPTH: usize = 3;

const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor"];

/// Resolve workspace patterns to existing directories relative to `root`.
///
/// The result is sorted and deduplicated. The root itself is never returned.
pub fn resolve_patterns(fs: &dyn FileSystem, root: &Path, patterns: &[String]) -> Vec<String> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        match pattern.strip_prefix('!') {
            Some(excluded) => excludes.push(segments(excluded)),
            None => includes.push(segments(pattern)),
        }
    }

    let mut resolved = BTreeSet::new();
    for pattern in includes {
        // Never leave the checkout
        if pattern.iter().any(|s| s == "..") {
            continue;
        }
        for relative in expand(fs, root, &pattern) {
            if relative.is_empty() {
                continue;
            }
            let path_segments: Vec<&str> = relative.split('/').collect();
            if excludes
                .iter()
                .any(|exclude| matches_segments(exclude, &path_segments))
            {
                continue;
            }
            resolved.insert(relative);
        }
    }

    resolved.into_iter().collect()
}

fn segments(pattern: &str) -> Vec<String> {
    pattern
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(String::from)
        .collect()
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains('*') || segment.contains('?')
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

fn child_dirs(fs: &dyn FileSystem, root: &Path, base: &str) -> Vec<String> {
    let Ok(entries) = fs.read_dir(&root.join(base)) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter(|entry| entry.is_dir())
        .map(|entry| entry.file_name().to_string())
        .filter(|name| !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_str()))
        .collect()
}

fn collect_descendants(
    fs: &dyn FileSystem,
    root: &Path,
    base: &str,
    depth: usize,
    out: &mut Vec<String>,
) {
    out.push(base.to_string());
    if depth == 0 {
        return;
    }
    for name in child_dirs(fs, root, base) {
        collect_descendants(fs, root, &join(base, &name), depth - 1, out);
    }
}

fn expand(fs: &dyn FileSystem, root: &Path, pattern: &[String]) -> Vec<String> {
    let mut current = vec![String::new()];

    for segment in pattern {
        let mut next = Vec::new();
        for base in &current {
            if segment == "**" {
                collect_descendants(fs, root, base, MAX_GLOBSTAR_DEPTH, &mut next);
            } else if is_wildcard(segment) {
                next.extend(
                    child_dirs(fs, root, base)
                        .into_iter()
                        .filter(|name| wildcard_match(segment, name))
                        .map(|name| join(base, &name)),
                );
            } else {
                let candidate = join(base, segment);
                if fs.is_dir(&root.join(&candidate)) {
                    next.push(candidate);
                }
            }
        }
        next.sort();
        next.dedup();
        current = next;
    }

    current
}

/// Match a relative path against pattern segments; `**` spans any number of segments
fn matches_segments(pattern: &[String], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((first, rest)) if first == "**" => {
            (0..=path.len()).any(|skip| matches_segments(rest, &path[skip..]))
        }
        Some((first, rest)) => match path.split_first() {
            Some((name, remaining)) => {
                wildcard_match(first, name) && matches_segments(rest, remaining)
            }
            None => false,
        },
    }
}

/// `*` and `?` matching within a single path segment
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[char], name: &[char]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some(('*', rest)) => (0..=name.len()).any(|skip| matches(rest, &name[skip..])),
            Some(('?', rest)) => !name.is_empty() && matches(rest, &name[1..]),
            Some((c, rest)) => name.first() == Some(c) && matches(rest, &name[1..]),
        }
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    matches(&pattern, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_dir("apps/web");
        fs.add_dir("apps/api");
        fs.add_dir("apps/.cache");
        fs.add_dir("packages/ui");
        fs.add_dir("packages/config");
        fs.add_dir("packages/node_modules/left-pad");
        fs.add_dir("services/billing/worker");
        fs.add_file("apps/README.md", "# apps");
        fs
    }

    #[test]
    fn test_single_star() {
        let fs = fixture();
        let resolved = resolve_patterns(&fs, Path::new("/mock"), &patterns(&["apps/*"]));
        assert_eq!(resolved, vec!["apps/api", "apps/web"]);
    }

    #[test]
    fn test_exclusion() {
        let fs = fixture();
        let resolved = resolve_patterns(
            &fs,
            Path::new("/mock"),
            &patterns(&["apps/*", "packages/*", "!packages/config"]),
        );
        assert_eq!(resolved, vec!["apps/api", "apps/web", "packages/ui"]);
    }

    #[test]
    fn test_globstar_skips_node_modules() {
        let fs = fixture();
        let resolved = resolve_patterns(&fs, Path::new("/mock"), &patterns(&["packages/**"]));
        assert_eq!(resolved, vec!["packages", "packages/config", "packages/ui"]);
    }

    #[test]
    fn test_literal_paths_and_dedup() {
        let fs = fixture();
        let resolved = resolve_patterns(
            &fs,
            Path::new("/mock"),
            &patterns(&["./apps/web", "apps/web/", "apps/missing", "../outside"]),
        );
        assert_eq!(resolved, vec!["apps/web"]);
    }

    #[test]
    fn test_nested_wildcards() {
        let fs = fixture();
        let resolved = resolve_patterns(&fs, Path::new("/mock"), &patterns(&["services/*/work?r"]));
        assert_eq!(resolved, vec!["services/billing/worker"]);
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", "web"));
        assert!(wildcard_match("web-*", "web-admin"));
        assert!(!wildcard_match("web-*", "api"));
        assert!(wildcard_match("a?i", "api"));
    }
}
