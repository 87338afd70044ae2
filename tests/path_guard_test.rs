use repolift::config::AnalyzerConfig;
use repolift::detection::RepositoryAnalyzer;
use repolift::error::PathSecurityError;
use repolift::fs::RealFileSystem;
use repolift::security::{DiskUsageProbe, DuProbe, FixedSizeProbe, PathGuard};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const LIMIT: u64 = 500 * 1024 * 1024;

fn guard(scratch: &Path, size: u64) -> PathGuard {
    PathGuard::new(
        Arc::new(RealFileSystem),
        Arc::new(FixedSizeProbe(size)),
        scratch,
        LIMIT,
    )
}

fn scratch_with_repo() -> TempDir {
    let scratch = TempDir::new().unwrap();
    fs::create_dir(scratch.path().join("repo")).unwrap();
    fs::write(scratch.path().join("repo/package.json"), "{}").unwrap();
    scratch
}

#[test]
fn test_contained_checkout_passes() {
    let scratch = scratch_with_repo();
    guard(scratch.path(), 1024)
        .validate(&scratch.path().join("repo"))
        .unwrap();
}

#[test]
fn test_missing_path() {
    let scratch = scratch_with_repo();
    let err = guard(scratch.path(), 1024)
        .validate(&scratch.path().join("missing"))
        .unwrap_err();
    assert!(matches!(err, PathSecurityError::NotFound(_)));
}

#[test]
fn test_file_is_not_a_checkout() {
    let scratch = scratch_with_repo();
    let err = guard(scratch.path(), 1024)
        .validate(&scratch.path().join("repo/package.json"))
        .unwrap_err();
    assert!(matches!(err, PathSecurityError::NotADirectory(_)));
}

#[test]
fn test_parent_traversal_is_rejected() {
    let scratch = scratch_with_repo();
    let outside = TempDir::new().unwrap();
    let outside_name = outside.path().file_name().unwrap();

    let sneaky = scratch.path().join("repo/../..").join(outside_name);
    let err = guard(scratch.path(), 1024).validate(&sneaky).unwrap_err();
    assert!(matches!(err, PathSecurityError::OutsideScratchRoot { .. }));
}

#[test]
fn test_scratch_root_itself_is_rejected() {
    let scratch = scratch_with_repo();
    let err = guard(scratch.path(), 1024)
        .validate(scratch.path())
        .unwrap_err();
    assert!(matches!(err, PathSecurityError::OutsideScratchRoot { .. }));
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_is_rejected() {
    let scratch = scratch_with_repo();
    let outside = TempDir::new().unwrap();
    let link = scratch.path().join("escape");
    std::os::unix::fs::symlink(outside.path(), &link).unwrap();

    let err = guard(scratch.path(), 1024).validate(&link).unwrap_err();
    assert!(matches!(err, PathSecurityError::OutsideScratchRoot { .. }));
}

#[test]
fn test_oversized_checkout() {
    let scratch = scratch_with_repo();
    let err = guard(scratch.path(), LIMIT + 1)
        .validate(&scratch.path().join("repo"))
        .unwrap_err();
    match err {
        PathSecurityError::TooLarge {
            size_bytes,
            limit_bytes,
            ..
        } => {
            assert_eq!(size_bytes, LIMIT + 1);
            assert_eq!(limit_bytes, LIMIT);
        }
        other => panic!("Expected TooLarge, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_du_probe_measures_directory() {
    let scratch = scratch_with_repo();
    let data: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    fs::write(scratch.path().join("repo/data.bin"), data).unwrap();

    let size = DuProbe.size_bytes(&scratch.path().join("repo")).unwrap();
    assert!(size > 0);

    PathGuard::new(Arc::new(RealFileSystem), Arc::new(DuProbe), scratch.path(), LIMIT)
        .validate(&scratch.path().join("repo"))
        .unwrap();
}

#[cfg(unix)]
#[test]
fn test_symlinked_env_example_outside_checkout_is_not_read() {
    let scratch = scratch_with_repo();
    let host = TempDir::new().unwrap();
    fs::write(host.path().join("host.env"), "HOST_SECRET=s3cr3t-from-host\n").unwrap();
    fs::write(
        scratch.path().join("repo/package.json"),
        r#"{"name": "shop", "dependencies": {"express": "4"}}"#,
    )
    .unwrap();
    std::os::unix::fs::symlink(
        host.path().join("host.env"),
        scratch.path().join("repo/.env.example"),
    )
    .unwrap();

    let analyzer = RepositoryAnalyzer::new(
        Arc::new(RealFileSystem),
        Arc::new(FixedSizeProbe(1024)),
        &AnalyzerConfig::new(scratch.path()),
    );
    let result = analyzer.analyze(&scratch.path().join("repo")).unwrap();

    assert_eq!(result.applications[0].name, "shop");
    assert!(result.env_variables.is_empty(), "{:?}", result.env_variables);
}

#[cfg(unix)]
#[test]
fn test_symlinked_workspace_outside_checkout_is_skipped() {
    let scratch = scratch_with_repo();
    let host = TempDir::new().unwrap();
    fs::write(
        host.path().join("package.json"),
        r#"{"name": "intruder", "dependencies": {"express": "4"}}"#,
    )
    .unwrap();
    fs::write(
        scratch.path().join("repo/package.json"),
        r#"{"name": "platform", "private": true, "workspaces": ["apps/web", "apps/intruder"]}"#,
    )
    .unwrap();
    fs::create_dir_all(scratch.path().join("repo/apps/web")).unwrap();
    fs::write(
        scratch.path().join("repo/apps/web/package.json"),
        r#"{"dependencies": {"next": "14"}}"#,
    )
    .unwrap();
    std::os::unix::fs::symlink(host.path(), scratch.path().join("repo/apps/intruder")).unwrap();

    let analyzer = RepositoryAnalyzer::new(
        Arc::new(RealFileSystem),
        Arc::new(FixedSizeProbe(1024)),
        &AnalyzerConfig::new(scratch.path()),
    );
    let result = analyzer.analyze(&scratch.path().join("repo")).unwrap();

    let names: Vec<_> = result.applications.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["web"]);
}
