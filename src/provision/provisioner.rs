//! Turns an [`AnalysisResult`] into live infrastructure inside one transaction

use super::engines::DatabaseEngineRegistry;
use super::store::{AddressGenerator, DestinationResolver, ProvisioningTransaction, UnitOfWork};
use super::types::{
    ApplicationHandle, DatabaseHandle, Environment, GitConfig, NewApplication, NewDatabase,
    NewEnvVariable, NewResourceLink, ProvisioningResult, ResourceLinkHandle, VolumeHint,
};
use crate::config::ProvisionerConfig;
use crate::detection::types::{AnalysisResult, BuildPack, DetectedApp, DetectedDatabase, EnvCategory};
use crate::error::ProvisioningError;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct InfrastructureProvisioner {
    unit_of_work: Arc<dyn UnitOfWork>,
    destinations: Arc<dyn DestinationResolver>,
    addresses: Arc<dyn AddressGenerator>,
    engines: DatabaseEngineRegistry,
    config: ProvisionerConfig,
}

/// Per-run state threaded through the steps
struct Run<'a> {
    analysis: &'a AnalysisResult,
    environment: &'a Environment,
    destination_id: &'a str,
    git: &'a GitConfig,
    group_id: Option<String>,
}

impl InfrastructureProvisioner {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        destinations: Arc<dyn DestinationResolver>,
        addresses: Arc<dyn AddressGenerator>,
    ) -> Self {
        Self {
            unit_of_work,
            destinations,
            addresses,
            engines: DatabaseEngineRegistry::with_defaults(),
            config: ProvisionerConfig::default(),
        }
    }

    pub fn with_engines(mut self, engines: DatabaseEngineRegistry) -> Self {
        self.engines = engines;
        self
    }

    pub fn with_config(mut self, config: ProvisionerConfig) -> Self {
        self.config = config;
        self
    }

    /// Create databases, applications, links and variables atomically.
    ///
    /// The monorepo group id is `monorepo_group_id` when given, a fresh UUID when
    /// the analysis is a monorepo, and absent otherwise. On any failure the
    /// transaction is rolled back and nothing is left behind.
    pub async fn provision(
        &self,
        analysis: &AnalysisResult,
        environment: &Environment,
        destination_id: &str,
        git: &GitConfig,
        monorepo_group_id: Option<String>,
    ) -> Result<ProvisioningResult, ProvisioningError> {
        let repository = git.repository_url.clone();
        let group_id = monorepo_group_id.or_else(|| {
            analysis
                .monorepo
                .is_monorepo
                .then(|| Uuid::new_v4().to_string())
        });

        let mut tx = self
            .unit_of_work
            .begin()
            .await
            .context("Failed to open provisioning transaction")
            .map_err(|e| self.fail(&repository, e))?;

        let run = Run {
            analysis,
            environment,
            destination_id,
            git,
            group_id,
        };

        let outcome = match self.execute(tx.as_mut(), &run).await {
            Ok(result) => tx
                .commit()
                .await
                .context("Failed to commit provisioning transaction")
                .map(|_| result),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                info!(
                    repository = %repository,
                    applications = result.applications.len(),
                    databases = result.databases.len(),
                    links = result.links.len(),
                    env_variables = result.env_variables,
                    "Provisioning committed"
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        repository = %repository,
                        error = %rollback_error,
                        "Rollback failed"
                    );
                }
                Err(self.fail(&repository, e))
            }
        }
    }

    fn fail(&self, repository: &str, e: anyhow::Error) -> ProvisioningError {
        error!(repository = %repository, error = %format!("{:#}", e), "Provisioning failed");
        ProvisioningError::new(repository, e)
    }

    async fn execute(
        &self,
        tx: &mut dyn ProvisioningTransaction,
        run: &Run<'_>,
    ) -> Result<ProvisioningResult> {
        let databases = self.create_databases(tx, run).await?;
        let applications = self.create_applications(tx, run).await?;
        let links = self.create_resource_links(tx, &databases, &applications).await?;
        let env_variables = self.create_env_variables(tx, run, &applications).await?;

        let mut database_handles = BTreeMap::new();
        for (detected, handle) in databases {
            let type_key = detected.db_type.id().to_string();
            let key = if database_handles.contains_key(&type_key) {
                format!("{}:{}", type_key, detected.name)
            } else {
                type_key
            };
            database_handles.insert(key, handle);
        }

        Ok(ProvisioningResult {
            applications,
            databases: database_handles,
            monorepo_group_id: run.group_id.clone(),
            links,
            env_variables,
            provisioned_at: Utc::now(),
        })
    }

    async fn create_databases<'a>(
        &self,
        tx: &mut dyn ProvisioningTransaction,
        run: &Run<'a>,
    ) -> Result<Vec<(&'a DetectedDatabase, DatabaseHandle)>> {
        let analysis: &'a AnalysisResult = run.analysis;
        let mut created: Vec<(&'a DetectedDatabase, DatabaseHandle)> = Vec::new();

        for detected in &analysis.databases {
            let Some(engine) = self.engines.get(&detected.db_type) else {
                warn!(
                    db_type = %detected.db_type,
                    name = %detected.name,
                    "No engine registered, skipping database"
                );
                continue;
            };

            let suffix = detected
                .db_type
                .category()
                .map(|c| c.name_suffix())
                .unwrap_or("db");
            // Same service name on two engines: the type keeps the names apart
            let mut name = format!("{}-{}", detected.name, suffix);
            if created.iter().any(|(_, handle)| handle.name == name) {
                name = format!("{}-{}-{}", detected.name, detected.db_type.id(), suffix);
            }
            let credentials = engine.generate_credentials();
            let internal_url = engine.connection_url(&name, &credentials);

            let handle = tx
                .create_database(NewDatabase {
                    description: format!(
                        "{} for {}",
                        detected.db_type.display_name(),
                        detected.consumers.join(", ")
                    ),
                    db_type: detected.db_type.clone(),
                    image: engine.image().to_string(),
                    port: engine.port(),
                    credentials,
                    internal_url,
                    environment_id: run.environment.id.clone(),
                    destination_id: run.destination_id.to_string(),
                    name,
                })
                .await
                .with_context(|| format!("Failed to create database {}", detected.name))?;

            info!(database = %handle.name, db_type = %handle.db_type, "Database created");
            created.push((detected, handle));
        }

        Ok(created)
    }

    async fn create_applications(
        &self,
        tx: &mut dyn ProvisioningTransaction,
        run: &Run<'_>,
    ) -> Result<BTreeMap<String, ApplicationHandle>> {
        let destination = self
            .destinations
            .resolve(run.destination_id)
            .await
            .with_context(|| format!("Failed to resolve destination {}", run.destination_id))?;

        let mut created = BTreeMap::new();
        for app in &run.analysis.applications {
            let fqdn = self
                .addresses
                .generate(&app.name, run.environment)
                .await
                .with_context(|| format!("Failed to generate address for {}", app.name))?;

            let request = NewApplication {
                name: app.name.clone(),
                git: run.git.clone(),
                destination: destination.clone(),
                environment_id: run.environment.id.clone(),
                build_pack: app.build_pack,
                install_command: static_field(app, &app.install_command),
                build_command: app.build_command.clone(),
                publish_directory: static_field(app, &app.publish_directory),
                base_directory: base_directory(&app.path),
                ports_exposes: app.default_port,
                fqdn,
                monorepo_group_id: run.group_id.clone(),
                health_check_path: run
                    .analysis
                    .health_checks
                    .get(&app.name)
                    .and_then(|checks| checks.iter().find_map(|c| c.path.clone())),
                volumes: run
                    .analysis
                    .persistent_volumes
                    .iter()
                    .filter(|v| v.for_app == app.name)
                    .map(|v| VolumeHint {
                        name: v.name.clone(),
                        mount_path: v.mount_path.clone(),
                    })
                    .collect(),
            };

            let handle = tx
                .create_application(request)
                .await
                .with_context(|| format!("Failed to create application {}", app.name))?;
            info!(application = %handle.name, fqdn = %handle.fqdn, "Application created");
            created.insert(app.name.clone(), handle);
        }

        Ok(created)
    }

    async fn create_resource_links(
        &self,
        tx: &mut dyn ProvisioningTransaction,
        databases: &[(&DetectedDatabase, DatabaseHandle)],
        applications: &BTreeMap<String, ApplicationHandle>,
    ) -> Result<Vec<ResourceLinkHandle>> {
        let mut links = Vec::new();

        for (detected, database) in databases {
            for consumer in &detected.consumers {
                let application = applications.get(consumer).ok_or_else(|| {
                    anyhow!(
                        "Database {} is consumed by unknown application {}",
                        detected.name,
                        consumer
                    )
                })?;

                let link = tx
                    .create_resource_link(NewResourceLink {
                        database_id: database.id.clone(),
                        application_id: application.id.clone(),
                        env_var_name: detected.env_var_name.clone(),
                        auto_inject: true,
                        use_internal_address: true,
                    })
                    .await
                    .with_context(|| {
                        format!("Failed to link {} to {}", database.name, application.name)
                    })?;
                links.push(link);
            }
        }

        Ok(links)
    }

    /// Database and cache variables are covered by resource links
    async fn create_env_variables(
        &self,
        tx: &mut dyn ProvisioningTransaction,
        run: &Run<'_>,
        applications: &BTreeMap<String, ApplicationHandle>,
    ) -> Result<usize> {
        let mut written = 0;

        for var in &run.analysis.env_variables {
            if matches!(var.category, EnvCategory::Database | EnvCategory::Cache) {
                continue;
            }
            let application = applications.get(&var.for_app).ok_or_else(|| {
                anyhow!("Variable {} belongs to unknown application {}", var.key, var.for_app)
            })?;

            let (value, is_placeholder) = match &var.default_value {
                Some(value) => (value.clone(), false),
                None if var.is_required => (self.config.required_placeholder.clone(), true),
                None => (String::new(), false),
            };

            tx.set_env_variable(NewEnvVariable {
                application_id: application.id.clone(),
                key: var.key.clone(),
                value,
                is_placeholder,
            })
            .await
            .with_context(|| format!("Failed to set {} on {}", var.key, var.for_app))?;
            written += 1;
        }

        Ok(written)
    }
}

/// Install command and publish directory only apply to static builds
fn static_field(app: &DetectedApp, value: &Option<String>) -> Option<String> {
    (app.build_pack == BuildPack::Static)
        .then(|| value.clone())
        .flatten()
}

/// `"."` → `""`, `apps/web` → `/apps/web`
pub fn base_directory(path: &str) -> String {
    let trimmed = path.trim_start_matches("./").trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
