//! Repository analysis pipeline
//!
//! `analyze` runs strictly in order: path validation, monorepo detection, app
//! detection, per-app dependency analysis, then deduplication of shared databases
//! and services. Any failure aborts the whole analysis; there is no partial result.

use crate::config::AnalyzerConfig;
use crate::detection::app::AppDetector;
use crate::detection::dependency::DependencyAnalyzer;
use crate::detection::monorepo::MonorepoDetector;
use crate::detection::types::{
    AnalysisResult, DetectedApp, DetectedDatabase, DetectedService, MonorepoInfo,
};
use crate::error::{AnalysisFailure, PathSecurityError, RepositoryAnalysisError};
use crate::fs::{ConfinedFileSystem, FileSystem, RealFileSystem};
use crate::security::{DiskUsageProbe, DuProbe, PathGuard};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Stateless after construction; one instance may analyze many checkouts concurrently
pub struct RepositoryAnalyzer {
    fs: Arc<dyn FileSystem>,
    guard: PathGuard,
    monorepo: MonorepoDetector,
    apps: AppDetector,
    dependencies: DependencyAnalyzer,
}

impl RepositoryAnalyzer {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        probe: Arc<dyn DiskUsageProbe>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            fs: fs.clone(),
            guard: PathGuard::new(
                fs.clone(),
                probe,
                config.scratch_root.clone(),
                config.max_repo_size_bytes,
            ),
            monorepo: MonorepoDetector::new(fs.clone()),
            apps: AppDetector::new(fs.clone()),
            dependencies: DependencyAnalyzer::new(fs)
                .with_source_scan_depth(config.source_scan_depth),
        }
    }

    /// Real filesystem and `du`-based size probe
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(Arc::new(RealFileSystem), Arc::new(DuProbe), config)
    }

    pub fn with_monorepo_detector(mut self, detector: MonorepoDetector) -> Self {
        self.monorepo = detector;
        self
    }

    pub fn with_app_detector(mut self, detector: AppDetector) -> Self {
        self.apps = detector;
        self
    }

    pub fn with_dependency_analyzer(mut self, analyzer: DependencyAnalyzer) -> Self {
        self.dependencies = analyzer;
        self
    }

    pub fn analyze(&self, repo_path: &Path) -> Result<AnalysisResult, RepositoryAnalysisError> {
        let repository = repo_path.display().to_string();
        let start = Instant::now();

        match self.run(repo_path) {
            Ok(result) => {
                info!(
                    repository = %repository,
                    applications = result.applications.len(),
                    databases = result.databases.len(),
                    services = result.services.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Repository analysis complete"
                );
                Ok(result)
            }
            Err(failure) => {
                error!(repository = %repository, error = %failure, "Repository analysis failed");
                Err(RepositoryAnalysisError::new(repository, failure))
            }
        }
    }

    fn run(&self, repo_path: &Path) -> Result<AnalysisResult, AnalysisFailure> {
        self.guard.validate(repo_path)?;
        info!(path = %repo_path.display(), "Checkout validated");

        // Reads below the root must not follow links out of the checkout
        let root = self.fs.canonicalize(repo_path).map_err(|_| {
            AnalysisFailure::from(PathSecurityError::NotFound(repo_path.to_path_buf()))
        })?;
        let confined: Arc<dyn FileSystem> =
            Arc::new(ConfinedFileSystem::new(self.fs.clone(), root));
        let monorepo_detector = self.monorepo.with_file_system(confined.clone());
        let app_detector = self.apps.with_file_system(confined.clone());
        let dependency_analyzer = self.dependencies.with_file_system(confined);

        let mut monorepo = monorepo_detector.detect(repo_path)?;
        let applications = detect_apps(&app_detector, repo_path, &mut monorepo)?;
        info!(
            monorepo = monorepo.is_monorepo,
            applications = applications.len(),
            "Applications detected"
        );

        let mut databases: Vec<DetectedDatabase> = Vec::new();
        let mut services: Vec<DetectedService> = Vec::new();
        let mut env_variables = Vec::new();
        let mut persistent_volumes = Vec::new();
        let mut health_checks = BTreeMap::new();

        for app in &applications {
            let deps = dependency_analyzer.analyze(repo_path, app)?;

            for db in deps.databases {
                merge_database(&mut databases, db);
            }
            for service in deps.services {
                match services
                    .iter_mut()
                    .find(|s| s.service_type == service.service_type)
                {
                    Some(existing) => *existing = existing.with_merged(&service),
                    None => services.push(service),
                }
            }
            env_variables.extend(deps.env_variables);
            persistent_volumes.extend(deps.persistent_volumes);
            if !deps.health_checks.is_empty() {
                health_checks.insert(app.name.clone(), deps.health_checks);
            }
        }

        Ok(AnalysisResult {
            monorepo,
            applications,
            databases,
            services,
            env_variables,
            persistent_volumes,
            health_checks,
        })
    }
}

/// A monorepo with no recognizable workspace app is treated as a single app
fn detect_apps(
    detector: &AppDetector,
    repo_path: &Path,
    monorepo: &mut MonorepoInfo,
) -> Result<Vec<DetectedApp>, AnalysisFailure> {
    if monorepo.is_monorepo {
        let apps = detector.detect_from_monorepo(repo_path, monorepo)?;
        if !apps.is_empty() {
            return Ok(apps);
        }
        debug!(
            workspace_type = ?monorepo.workspace_type,
            "No applications in workspaces, falling back to single app"
        );
        *monorepo = MonorepoInfo::not_monorepo();
    }

    Ok(detector.detect_single_app(repo_path)?)
}

/// Databases sharing `(type, name)` collapse into one with the union of consumers
fn merge_database(databases: &mut Vec<DetectedDatabase>, db: DetectedDatabase) {
    match databases.iter_mut().find(|existing| existing.key() == db.key()) {
        Some(existing) => *existing = existing.with_merged_consumers(&db.consumers),
        None => databases.push(db),
    }
}
