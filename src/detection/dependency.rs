//! Per-app dependency analysis
//!
//! Collects database needs, third-party services, declared environment variables,
//! health checks and persistent storage hints for one [`DetectedApp`]. Sources are
//! read in a fixed order: compose, Dockerfile, env example files, CI configs, then
//! manifest drivers. Databases implied by env URLs, CI images or drivers are only
//! added when the app has no database of that type yet.

use crate::detection::rules::{
    self, categorize, implied_by_drivers, DriverRule, EnvCategoryRule, ServiceRule,
};
use crate::detection::types::{
    DependencyAnalysisResult, DetectedApp, DetectedDatabase, DetectedEnvVariable,
    DetectedPersistentVolume, DetectedService, DockerComposeService,
};
use crate::error::ParseError;
use crate::extractors::parsers::ci::read_ci_configs;
use crate::extractors::parsers::docker_compose::read_compose;
use crate::extractors::parsers::dockerfile::read_dockerfile;
use crate::extractors::parsers::env_file::read_env_examples;
use crate::extractors::parsers::manifest::parse_manifests;
use crate::fs::FileSystem;
use crate::stack::{DatabaseType, DependencyPattern};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub const DEFAULT_SOURCE_SCAN_DEPTH: usize = 3;
pub const DATA_MOUNT_PATH: &str = "/app/data";

const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "mjs", "cjs", "jsx", "ts", "tsx", "py", "rb", "php", "go", "rs", "java", "kt", "ex",
    "exs",
];
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor", "dist", "build"];

#[derive(Clone)]
pub struct DependencyAnalyzer {
    fs: Arc<dyn FileSystem>,
    category_rules: Vec<EnvCategoryRule>,
    service_rules: Vec<ServiceRule>,
    driver_rules: Vec<DriverRule>,
    file_storage_drivers: Vec<DependencyPattern>,
    source_scan_depth: usize,
}

impl DependencyAnalyzer {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            category_rules: rules::default_env_category_rules(),
            service_rules: rules::default_service_rules(),
            driver_rules: rules::default_driver_rules(),
            file_storage_drivers: rules::file_storage_drivers(),
            source_scan_depth: DEFAULT_SOURCE_SCAN_DEPTH,
        }
    }

    pub fn with_category_rules(mut self, rules: Vec<EnvCategoryRule>) -> Self {
        self.category_rules = rules;
        self
    }

    pub fn with_service_rules(mut self, rules: Vec<ServiceRule>) -> Self {
        self.service_rules = rules;
        self
    }

    pub fn with_driver_rules(mut self, rules: Vec<DriverRule>) -> Self {
        self.driver_rules = rules;
        self
    }

    /// Directory levels searched for `.sqlite`/`.db` references; 0 disables the scan
    pub fn with_source_scan_depth(mut self, depth: usize) -> Self {
        self.source_scan_depth = depth;
        self
    }

    pub fn with_file_system(&self, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            ..self.clone()
        }
    }

    pub fn analyze(
        &self,
        repo_path: &Path,
        app: &DetectedApp,
    ) -> Result<DependencyAnalysisResult, ParseError> {
        let app_dir = if app.is_root() {
            repo_path.to_path_buf()
        } else {
            repo_path.join(&app.path)
        };

        let mut result = DependencyAnalysisResult::default();

        self.apply_compose(repo_path, &app_dir, app, &mut result)?;

        if let Some(dockerfile) = read_dockerfile(self.fs.as_ref(), &app_dir)? {
            if let Some(check) = &dockerfile.healthcheck {
                result.health_checks.push(check.clone());
            }
            result.dockerfile = Some(dockerfile);
        }

        // Env example entries go first so their defaults win over compose values
        let mut env_variables = Vec::new();
        for entry in read_env_examples(self.fs.as_ref(), &app_dir)? {
            env_variables.push(DetectedEnvVariable {
                category: categorize(&self.category_rules, &entry.key),
                key: entry.key,
                default_value: entry.default_value,
                is_required: entry.required,
                for_app: app.name.clone(),
            });
        }
        for var in std::mem::take(&mut result.env_variables) {
            if !env_variables.iter().any(|v: &DetectedEnvVariable| v.key == var.key) {
                env_variables.push(var);
            }
        }
        result.env_variables = env_variables;

        for var in &result.env_variables {
            let implied = var
                .default_value
                .as_deref()
                .and_then(DatabaseType::from_url);
            if let Some(db_type) = implied {
                add_implied(&mut result.databases, db_type, format!("env:{}", var.key), app);
            }
        }

        result.ci = read_ci_configs(self.fs.as_ref(), repo_path)?;
        if app.is_root() {
            for config in &result.ci {
                for image in &config.service_images {
                    if let Some(db_type) = DatabaseType::from_image(image) {
                        add_implied(
                            &mut result.databases,
                            db_type,
                            format!("ci:{}", config.provider),
                            app,
                        );
                    }
                }
            }
        }

        let manifest = parse_manifests(self.fs.as_ref(), &app_dir)?;
        for (dep, db_type) in implied_by_drivers(&self.driver_rules, &manifest.dependencies) {
            add_implied(
                &mut result.databases,
                db_type,
                format!("dependency:{}", dep.name),
                app,
            );
        }

        result.services = self.detect_services(&result.env_variables, app);

        let storage_reason = manifest
            .dependencies
            .iter()
            .find(|dep| self.file_storage_drivers.iter().any(|p| p.matches(dep)))
            .map(|dep| format!("dependency:{}", dep.name))
            .or_else(|| file_url_reason(&result.env_variables))
            .or_else(|| self.scan_sources(&app_dir));
        if let Some(reason) = storage_reason {
            result.persistent_volumes.push(DetectedPersistentVolume {
                name: format!("{}-data", app.name),
                mount_path: DATA_MOUNT_PATH.to_string(),
                reason,
                for_app: app.name.clone(),
            });
        }

        debug!(
            app = %app.name,
            databases = result.databases.len(),
            services = result.services.len(),
            env_variables = result.env_variables.len(),
            health_checks = result.health_checks.len(),
            persistent_volumes = result.persistent_volumes.len(),
            "Analyzed app dependencies"
        );

        Ok(result)
    }

    /// Compose file in the app directory, else the root one for workspace apps. With
    /// the root file only services named like the app contribute env vars and checks.
    fn apply_compose(
        &self,
        repo_path: &Path,
        app_dir: &Path,
        app: &DetectedApp,
        result: &mut DependencyAnalysisResult,
    ) -> Result<(), ParseError> {
        let (services, from_root) = match read_compose(self.fs.as_ref(), app_dir)? {
            Some(services) => (services, false),
            None if !app.is_root() => match read_compose(self.fs.as_ref(), repo_path)? {
                Some(services) => (services, true),
                None => return Ok(()),
            },
            None => return Ok(()),
        };

        for service in &services {
            let db_type = service.image.as_deref().and_then(DatabaseType::from_image);
            if let Some(db_type) = db_type {
                let port = service.container_port().or_else(|| db_type.default_port());
                if !result.databases.iter().any(|d| d.name == service.name && d.db_type == db_type) {
                    result.databases.push(
                        DetectedDatabase::new(db_type, service.name.clone())
                            .with_detected_via("docker-compose")
                            .with_port(port)
                            .with_consumer(app.name.clone()),
                    );
                }
                continue;
            }

            if from_root && !service_belongs_to(service, app) {
                continue;
            }

            for (key, value) in &service.environment {
                if result.env_variables.iter().any(|v| &v.key == key) {
                    continue;
                }
                result.env_variables.push(DetectedEnvVariable {
                    key: key.clone(),
                    default_value: value.clone(),
                    is_required: value.is_none(),
                    category: categorize(&self.category_rules, key),
                    for_app: app.name.clone(),
                });
            }
            if let Some(check) = &service.healthcheck {
                result.health_checks.push(check.clone());
            }
        }

        Ok(())
    }

    /// One service per type, env vars in declaration order
    fn detect_services(
        &self,
        env_variables: &[DetectedEnvVariable],
        app: &DetectedApp,
    ) -> Vec<DetectedService> {
        let mut services: Vec<DetectedService> = Vec::new();

        for var in env_variables {
            let Some(rule) = self.service_rules.iter().find(|r| r.matches(&var.key)) else {
                continue;
            };
            match services.iter_mut().find(|s| s.service_type == rule.service_type) {
                Some(existing) => {
                    if !existing.required_env_vars.contains(&var.key) {
                        existing.required_env_vars.push(var.key.clone());
                    }
                }
                None => services.push(DetectedService {
                    service_type: rule.service_type.clone(),
                    description: rule.description.clone(),
                    required_env_vars: vec![var.key.clone()],
                    consumers: vec![app.name.clone()],
                }),
            }
        }

        services
    }

    fn scan_sources(&self, app_dir: &Path) -> Option<String> {
        let found = self.scan_dir(app_dir, self.source_scan_depth)?;
        let relative = found
            .strip_prefix(app_dir)
            .unwrap_or(&found)
            .to_string_lossy()
            .to_string();
        Some(format!("source:{}", relative))
    }

    fn scan_dir(&self, dir: &Path, remaining: usize) -> Option<PathBuf> {
        if remaining == 0 {
            return None;
        }
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                return None;
            }
        };

        for entry in entries.iter().filter(|e| e.is_file()) {
            let is_source = Path::new(entry.file_name())
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if !is_source {
                continue;
            }
            // Binary or non-UTF-8 files are not source worth scanning
            let Ok(content) = self.fs.read_to_string(entry.path()) else {
                continue;
            };
            if references_local_database(&content) {
                return Some(entry.path().to_path_buf());
            }
        }

        entries
            .iter()
            .filter(|e| e.is_dir())
            .filter(|e| !e.file_name().starts_with('.') && !SKIPPED_DIRS.contains(&e.file_name()))
            .find_map(|e| self.scan_dir(e.path(), remaining - 1))
    }
}

fn add_implied(
    databases: &mut Vec<DetectedDatabase>,
    db_type: DatabaseType,
    detected_via: String,
    app: &DetectedApp,
) {
    if databases.iter().any(|d| d.db_type == db_type) {
        return;
    }
    debug!(app = %app.name, db_type = %db_type, via = %detected_via, "Implied database");
    let port = db_type.default_port();
    databases.push(
        DetectedDatabase::new(db_type.clone(), db_type.id())
            .with_detected_via(detected_via)
            .with_port(port)
            .with_consumer(app.name.clone()),
    );
}

/// `api` matches services `api`, `api-server`, `shop-api`
fn service_belongs_to(service: &DockerComposeService, app: &DetectedApp) -> bool {
    let name = service.name.to_lowercase();
    let app_name = app.name.to_lowercase();
    name == app_name
        || name.starts_with(&format!("{}-", app_name))
        || name.ends_with(&format!("-{}", app_name))
        || app.path.rsplit('/').next().is_some_and(|dir| dir.eq_ignore_ascii_case(&name))
}

fn file_url_reason(env_variables: &[DetectedEnvVariable]) -> Option<String> {
    env_variables.iter().find_map(|var| {
        let value = var.default_value.as_deref()?.trim();
        (value.starts_with("sqlite:") || value.starts_with("file:"))
            .then(|| format!("env:{}", var.key))
    })
}

fn references_local_database(content: &str) -> bool {
    static DB_FILE: OnceLock<Regex> = OnceLock::new();
    let re = DB_FILE.get_or_init(|| {
        Regex::new(r#"["'`][^"'`\s]*\.(?:sqlite3?|db)["'`]"#).expect("valid regex")
    });
    re.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{AppType, BuildPack, EnvCategory};
    use crate::fs::MockFileSystem;
    use crate::stack::FrameworkId;

    fn app(name: &str, path: &str) -> DetectedApp {
        DetectedApp {
            name: name.to_string(),
            path: path.to_string(),
            framework: FrameworkId::Express,
            build_pack: BuildPack::Nixpacks,
            default_port: 3000,
            install_command: None,
            build_command: None,
            publish_directory: None,
            app_type: AppType::Backend,
        }
    }

    fn analyze(fs: MockFileSystem, app: &DetectedApp) -> DependencyAnalysisResult {
        DependencyAnalyzer::new(Arc::new(fs))
            .analyze(Path::new("/mock"), app)
            .unwrap()
    }

    #[test]
    fn test_compose_database_and_app_env() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "docker-compose.yml",
            r#"
services:
  db:
    image: postgres:15
    ports: ["5433:5432"]
  web:
    build: .
    environment:
      NODE_ENV: production
      DATABASE_URL: ${DATABASE_URL}
    healthcheck:
      test: ["CMD", "curl", "-f", "http://localhost:3000/health"]
"#,
        );

        let result = analyze(fs, &app("web", "."));

        assert_eq!(result.databases.len(), 1);
        let db = &result.databases[0];
        assert_eq!(db.db_type, DatabaseType::Postgresql);
        assert_eq!(db.name, "db");
        assert_eq!(db.env_var_name, "DATABASE_URL");
        assert_eq!(db.detected_via.as_deref(), Some("docker-compose"));
        assert_eq!(db.port, Some(5432));
        assert_eq!(db.consumers, vec!["web"]);

        let node_env = result.env_variables.iter().find(|v| v.key == "NODE_ENV").unwrap();
        assert_eq!(node_env.default_value.as_deref(), Some("production"));
        assert!(!node_env.is_required);

        let db_url = result.env_variables.iter().find(|v| v.key == "DATABASE_URL").unwrap();
        assert_eq!(db_url.default_value, None);
        assert!(db_url.is_required);
        assert_eq!(db_url.category, EnvCategory::Database);

        assert_eq!(result.health_checks.len(), 1);
        assert_eq!(result.health_checks[0].path.as_deref(), Some("/health"));
    }

    #[test]
    fn test_env_url_implies_database_once_per_type() {
        let fs = MockFileSystem::new();
        fs.add_file(
            ".env.example",
            "DATABASE_URL=postgres://localhost:5432/app\nREPLICA_URL=postgres://replica/app\nREDIS_URL=redis://localhost:6379\n",
        );

        let result = analyze(fs, &app("api", "."));
        let summary: Vec<_> = result
            .databases
            .iter()
            .map(|d| (d.db_type.clone(), d.name.as_str(), d.detected_via.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (DatabaseType::Postgresql, "postgresql", Some("env:DATABASE_URL")),
                (DatabaseType::Redis, "redis", Some("env:REDIS_URL")),
            ]
        );
        assert_eq!(result.databases[1].port, Some(6379));
    }

    #[test]
    fn test_compose_database_suppresses_implied_duplicate() {
        let fs = MockFileSystem::new();
        fs.add_file("docker-compose.yml", "services:\n  postgres:\n    image: postgres:16\n");
        fs.add_file("package.json", r#"{"dependencies": {"pg": "8"}}"#);
        fs.add_file(".env.example", "DATABASE_URL=postgres://localhost/app\n");

        let result = analyze(fs, &app("api", "."));
        assert_eq!(result.databases.len(), 1);
        assert_eq!(result.databases[0].name, "postgres");
    }

    #[test]
    fn test_driver_dependencies_imply_databases() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "requirements.txt",
            "django==5.0\npsycopg2-binary==2.9.9\nredis>=5\n",
        );

        let result = analyze(fs, &app("api", "."));
        let via: Vec<_> = result
            .databases
            .iter()
            .filter_map(|d| d.detected_via.clone())
            .collect();
        assert_eq!(via, vec!["dependency:psycopg2-binary", "dependency:redis"]);
    }

    #[test]
    fn test_ci_services_only_for_root_app() {
        let fs = MockFileSystem::new();
        fs.add_file(
            ".github/workflows/test.yml",
            "jobs:\n  test:\n    services:\n      mongo:\n        image: mongo:7\n",
        );
        fs.add_dir("apps/api");

        let root = analyze(fs.clone(), &app("shop", "."));
        assert_eq!(root.databases.len(), 1);
        assert_eq!(root.databases[0].detected_via.as_deref(), Some("ci:github"));
        assert_eq!(root.ci.len(), 1);

        let nested = analyze(fs, &app("api", "apps/api"));
        assert!(nested.databases.is_empty());
        assert_eq!(nested.ci.len(), 1);
    }

    #[test]
    fn test_services_grouped_by_type() {
        let fs = MockFileSystem::new();
        fs.add_file(
            ".env.example",
            "STRIPE_SECRET_KEY=\nSTRIPE_WEBHOOK_SECRET=\nALGOLIA_APP_ID=\nELASTICSEARCH_URL=http://localhost:9200\nPORT=3000\n",
        );

        let result = analyze(fs, &app("api", "."));
        assert_eq!(result.services.len(), 2);
        assert_eq!(result.services[0].service_type, "payments");
        assert_eq!(
            result.services[0].required_env_vars,
            vec!["STRIPE_SECRET_KEY", "STRIPE_WEBHOOK_SECRET"]
        );
        assert_eq!(result.services[1].service_type, "search");
        assert_eq!(
            result.services[1].required_env_vars,
            vec!["ALGOLIA_APP_ID", "ELASTICSEARCH_URL"]
        );
        assert_eq!(result.services[1].consumers, vec!["api"]);
    }

    #[test]
    fn test_workspace_app_uses_root_compose_services_named_like_it() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "docker-compose.yml",
            r#"
services:
  postgres:
    image: postgres:15
  api:
    environment:
      - API_PORT=4000
  web:
    environment:
      - NEXT_PUBLIC_API=http://api:4000
"#,
        );
        fs.add_file("apps/api/package.json", "{}");

        let result = analyze(fs, &app("api", "apps/api"));
        assert_eq!(result.databases.len(), 1);
        assert_eq!(result.databases[0].consumers, vec!["api"]);
        let keys: Vec<_> = result.env_variables.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["API_PORT"]);
    }

    #[test]
    fn test_env_example_default_wins_over_compose() {
        let fs = MockFileSystem::new();
        fs.add_file(".env.example", "PORT=8080\n");
        fs.add_file(
            "docker-compose.yml",
            "services:\n  app:\n    environment:\n      PORT: \"3000\"\n",
        );

        let result = analyze(fs, &app("app", "."));
        assert_eq!(result.env_variables.len(), 1);
        assert_eq!(result.env_variables[0].default_value.as_deref(), Some("8080"));
    }

    #[test]
    fn test_dockerfile_healthcheck_and_info() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "Dockerfile",
            "FROM node:20-alpine\nEXPOSE 3000\nHEALTHCHECK --interval=30s CMD wget -qO- http://localhost:3000/healthz || exit 1\n",
        );

        let result = analyze(fs, &app("web", "."));
        let dockerfile = result.dockerfile.unwrap();
        assert_eq!(dockerfile.exposed_ports, vec![3000]);
        assert_eq!(result.health_checks.len(), 1);
        assert_eq!(result.health_checks[0].path.as_deref(), Some("/healthz"));
        assert_eq!(result.health_checks[0].source, "dockerfile");
    }

    #[test]
    fn test_sqlite_driver_requests_volume() {
        let fs = MockFileSystem::new();
        fs.add_file("package.json", r#"{"dependencies": {"better-sqlite3": "9"}}"#);

        let result = analyze(fs, &app("notes", "."));
        assert_eq!(
            result.persistent_volumes,
            vec![DetectedPersistentVolume {
                name: "notes-data".to_string(),
                mount_path: "/app/data".to_string(),
                reason: "dependency:better-sqlite3".to_string(),
                for_app: "notes".to_string(),
            }]
        );
    }

    #[test]
    fn test_sqlite_url_requests_volume() {
        let fs = MockFileSystem::new();
        fs.add_file(".env.example", "DATABASE_URL=sqlite:./data/app.db\n");

        let result = analyze(fs, &app("notes", "."));
        assert_eq!(result.persistent_volumes[0].reason, "env:DATABASE_URL");
        assert!(result.databases.is_empty());
    }

    #[test]
    fn test_source_scan_respects_depth_and_skips_node_modules() {
        let fs = MockFileSystem::new();
        fs.add_file("node_modules/lib/index.js", "open('cache.db')");
        fs.add_file("src/a/b/c/store.py", "sqlite3.connect('app.sqlite')");

        let shallow = DependencyAnalyzer::new(Arc::new(fs.clone()))
            .analyze(Path::new("/mock"), &app("app", "."))
            .unwrap();
        assert!(shallow.persistent_volumes.is_empty());

        let deep = DependencyAnalyzer::new(Arc::new(fs))
            .with_source_scan_depth(5)
            .analyze(Path::new("/mock"), &app("app", "."))
            .unwrap();
        assert_eq!(deep.persistent_volumes[0].reason, "source:src/a/b/c/store.py");
    }

    #[test]
    fn test_malformed_env_example_fails_whole_analysis() {
        let fs = MockFileSystem::new();
        fs.add_file(".env.example", "PORT=3000\nnot a variable\n");

        let err = DependencyAnalyzer::new(Arc::new(fs))
            .analyze(Path::new("/mock"), &app("app", "."))
            .unwrap_err();
        assert!(err.file.ends_with(".env.example"));
    }
}
