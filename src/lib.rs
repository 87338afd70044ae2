//! repolift - repository analysis and atomic infrastructure provisioning
//!
//! Inspects an arbitrary source checkout, infers which applications, databases and
//! external services it needs, then creates the matching infrastructure inside one
//! transaction.
//!
//! # Pipeline
//!
//! ```text
//! checkout path → RepositoryAnalyzer::analyze() → AnalysisResult
//!               → InfrastructureProvisioner::provision() → ProvisioningResult
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use repolift::{AnalyzerConfig, RepositoryAnalyzer};
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::from_env()?;
//! let analysis = RepositoryAnalyzer::from_config(&config)
//!     .analyze(Path::new("/tmp/repolift/shop"))?;
//!
//! for app in &analysis.applications {
//!     println!("{} ({}) on port {}", app.name, app.framework, app.default_port);
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`security`]: checkout containment and size checks
//! - [`stack`]: framework, database and workspace-manager tables
//! - [`extractors`]: manifest, Dockerfile, compose, env and CI parsers
//! - [`detection`]: monorepo, app and dependency detection plus the analyzer
//! - [`provision`]: transactional infrastructure creation

pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod extractors;
pub mod fs;
pub mod provision;
pub mod security;
pub mod stack;
pub mod util;

pub use config::{AnalyzerConfig, ConfigError, ConfigSource, ProvisionerConfig};
pub use detection::types::{AnalysisResult, DetectedApp, DetectedDatabase, MonorepoInfo};
pub use detection::RepositoryAnalyzer;
pub use error::{ParseError, PathSecurityError, ProvisioningError, RepositoryAnalysisError};
pub use provision::{InfrastructureProvisioner, ProvisioningResult};
pub use security::PathGuard;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
