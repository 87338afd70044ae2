//! Application detection
//!
//! Turns a directory into a [`DetectedApp`] by running the framework signature table
//! over its manifests and then applying the build pack rules:
//!
//! 1. `Dockerfile` present: `dockerfile`, port from the first `EXPOSE`
//! 2. compose file present and no framework matched: `dockercompose`
//! 3. framework with static output: `static`, `frontend`
//! 4. bare `index.html` without a manifest: `static`, `frontend`, port 80
//! 5. otherwise `nixpacks`

use crate::detection::types::{AppType, BuildPack, DetectedApp, MonorepoInfo};
use crate::error::ParseError;
use crate::extractors::parsers::docker_compose::{find_compose_file, read_compose};
use crate::extractors::parsers::dockerfile::read_dockerfile;
use crate::extractors::parsers::manifest::{parse_manifests, ManifestData};
use crate::fs::FileSystem;
use crate::stack::framework::{self, FrameworkSignature};
use crate::stack::{DatabaseType, FrameworkId};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const FALLBACK_PORT: u16 = 3000;
pub const STATIC_PORT: u16 = 80;

/// Node package managers keyed by lockfile, checked in order
const NODE_LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
    ("package-lock.json", "npm"),
];

#[derive(Clone)]
pub struct AppDetector {
    fs: Arc<dyn FileSystem>,
    signatures: Vec<FrameworkSignature>,
}

impl AppDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            signatures: framework::default_signatures(),
        }
    }

    /// Replace the framework table; rows are tried in order
    pub fn with_signatures(mut self, signatures: Vec<FrameworkSignature>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn with_file_system(&self, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            ..self.clone()
        }
    }

    /// Exactly one app rooted at `"."`
    pub fn detect_single_app(&self, path: &Path) -> Result<Vec<DetectedApp>, ParseError> {
        let manifest = parse_manifests(self.fs.as_ref(), path)?;
        let name = manifest
            .package_name
            .clone()
            .or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "app".to_string());

        let app = self.build_app(path, path, ".", name, &manifest)?;
        Ok(vec![app])
    }

    /// One app per recognizable workspace directory, named after the directory
    pub fn detect_from_monorepo(
        &self,
        path: &Path,
        info: &MonorepoInfo,
    ) -> Result<Vec<DetectedApp>, ParseError> {
        let mut apps: Vec<DetectedApp> = Vec::new();

        for workspace in &info.workspace_paths {
            let dir = path.join(workspace);
            let manifest = parse_manifests(self.fs.as_ref(), &dir)?;

            if !self.is_recognizable(&dir, &manifest) {
                debug!(workspace = %workspace, "Skipping workspace without an application");
                continue;
            }

            let base_name = workspace
                .rsplit('/')
                .next()
                .unwrap_or(workspace)
                .to_string();
            let name = if apps.iter().any(|a| a.name == base_name) {
                workspace.replace('/', "-")
            } else {
                base_name
            };

            apps.push(self.build_app(path, &dir, workspace, name, &manifest)?);
        }

        Ok(apps)
    }

    fn is_recognizable(&self, dir: &Path, manifest: &ManifestData) -> bool {
        manifest.has_manifest()
            || self.fs.is_file(&dir.join("Dockerfile"))
            || find_compose_file(self.fs.as_ref(), dir).is_some()
            || self.fs.is_file(&dir.join("index.html"))
    }

    fn build_app(
        &self,
        repo_root: &Path,
        dir: &Path,
        relative: &str,
        name: String,
        manifest: &ManifestData,
    ) -> Result<DetectedApp, ParseError> {
        let signature = self
            .signatures
            .iter()
            .find(|s| s.matches(self.fs.as_ref(), dir, &manifest.dependencies));

        let mut app = DetectedApp {
            name,
            path: relative.to_string(),
            framework: signature
                .map(|s| s.framework.clone())
                .unwrap_or(FrameworkId::Unknown),
            build_pack: BuildPack::Nixpacks,
            default_port: signature.map(|s| s.default_port).unwrap_or(FALLBACK_PORT),
            install_command: None,
            build_command: signature.and_then(|s| s.build_command.clone()),
            publish_directory: None,
            app_type: signature.map(|s| s.app_type).unwrap_or(AppType::Unknown),
        };

        let package_manager = self.node_package_manager(repo_root, dir);
        if let Some(build) = &app.build_command {
            if let Some(script) = build.strip_prefix("npm run ") {
                app.build_command = Some(format!("{} run {}", package_manager, script));
            }
        }

        if let Some(dockerfile) = read_dockerfile(self.fs.as_ref(), dir)? {
            app.build_pack = BuildPack::Dockerfile;
            if signature.is_none() {
                app.framework = FrameworkId::Docker;
            }
            if let Some(port) = dockerfile.exposed_ports.first() {
                app.default_port = *port;
            }
        } else if signature.is_none() && find_compose_file(self.fs.as_ref(), dir).is_some() {
            app.build_pack = BuildPack::DockerCompose;
            app.framework = FrameworkId::DockerCompose;
            if let Some(port) = self.compose_app_port(dir)? {
                app.default_port = port;
            }
        } else if let Some(signature) = signature.filter(|s| s.static_output) {
            app.build_pack = BuildPack::Static;
            app.app_type = AppType::Frontend;
            app.default_port = STATIC_PORT;
            app.install_command = Some(format!("{} install", package_manager));
            app.publish_directory = signature.publish_directory.clone();
        } else if !manifest.has_manifest() && self.fs.is_file(&dir.join("index.html")) {
            app.build_pack = BuildPack::Static;
            app.framework = FrameworkId::StaticSite;
            app.app_type = AppType::Frontend;
            app.default_port = STATIC_PORT;
            app.build_command = None;
        }

        debug!(
            app = %app.name,
            path = %app.path,
            framework = %app.framework,
            build_pack = %app.build_pack,
            port = app.default_port,
            "Detected application"
        );
        Ok(app)
    }

    /// Lockfile in the app directory, then the repository root; npm by default
    fn node_package_manager(&self, repo_root: &Path, dir: &Path) -> &'static str {
        [dir, repo_root]
            .iter()
            .find_map(|base| {
                NODE_LOCKFILES
                    .iter()
                    .find(|(lockfile, _)| self.fs.is_file(&base.join(lockfile)))
                    .map(|(_, manager)| *manager)
            })
            .unwrap_or("npm")
    }

    /// Container port of the first non-database compose service
    fn compose_app_port(&self, dir: &Path) -> Result<Option<u16>, ParseError> {
        let services = read_compose(self.fs.as_ref(), dir)?.unwrap_or_default();
        Ok(services
            .iter()
            .filter(|s| {
                s.image
                    .as_deref()
                    .and_then(DatabaseType::from_image)
                    .is_none()
            })
            .find_map(|s| s.container_port()))
    }
}
