//! Error taxonomy for the analysis and provisioning pipeline
//!
//! Leaf errors (`PathSecurityError`, `ParseError`) are raised by the individual
//! detectors. They never reach callers directly: `RepositoryAnalyzer` wraps the
//! first one it meets in a `RepositoryAnalysisError`, and the provisioner wraps
//! any collaborator failure in a `ProvisioningError` after rolling back.

use std::path::PathBuf;
use thiserror::Error;

/// Rejections raised while validating a checkout location
#[derive(Debug, Error)]
pub enum PathSecurityError {
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path {path} resolves outside the scratch root {root}")]
    OutsideScratchRoot { path: PathBuf, root: PathBuf },

    #[error("Repository at {path} is {size_bytes} bytes, exceeding the {limit_bytes} byte limit")]
    TooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit_bytes: u64,
    },

    #[error("Failed to measure size of {path}: {source}")]
    SizeProbeFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Scratch root is not usable: {0}")]
    InvalidScratchRoot(PathBuf),
}

/// Malformed manifest, Docker, compose, CI or env-example content
#[derive(Debug, Error)]
#[error("Failed to parse {file}: {reason}")]
pub struct ParseError {
    pub file: PathBuf,
    pub reason: String,
}

impl ParseError {
    pub fn new(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Reading an existing file failed; treated like unparseable content
    pub fn unreadable(file: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        Self::new(file, format!("unreadable: {:#}", error))
    }
}

/// Underlying cause of a failed analysis
#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error(transparent)]
    PathSecurity(#[from] PathSecurityError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The single error type surfaced by `RepositoryAnalyzer::analyze`
#[derive(Debug, Error)]
#[error("Analysis of repository {repository} failed: {source}")]
pub struct RepositoryAnalysisError {
    pub repository: String,
    #[source]
    pub source: AnalysisFailure,
}

impl RepositoryAnalysisError {
    pub fn new(repository: impl Into<String>, source: impl Into<AnalysisFailure>) -> Self {
        Self {
            repository: repository.into(),
            source: source.into(),
        }
    }

    pub fn is_path_security(&self) -> bool {
        matches!(self.source, AnalysisFailure::PathSecurity(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self.source, AnalysisFailure::Parse(_))
    }
}

/// The single error type surfaced by `InfrastructureProvisioner::provision`
#[derive(Debug, Error)]
#[error("Provisioning for repository {repository} failed: {message}")]
pub struct ProvisioningError {
    pub repository: String,
    pub message: String,
    #[source]
    pub source: anyhow::Error,
}

impl ProvisioningError {
    pub fn new(repository: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            repository: repository.into(),
            message: format!("{:#}", source),
            source,
        }
    }
}
