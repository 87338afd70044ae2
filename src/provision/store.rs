//! Collaborator seams used by the provisioner
//!
//! Every write goes through a [`ProvisioningTransaction`] obtained from a
//! [`UnitOfWork`]. Nothing is visible outside the transaction until `commit`.

use super::types::{
    ApplicationHandle, DatabaseHandle, Destination, Environment, NewApplication, NewDatabase,
    NewEnvVariable, NewResourceLink, ResourceLinkHandle,
};
use anyhow::{bail, Result};
use async_trait::async_trait;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn ProvisioningTransaction>>;
}

/// An open transaction. After `commit` or `rollback` the transaction is spent.
#[async_trait]
pub trait ProvisioningTransaction: Send {
    async fn create_database(&mut self, database: NewDatabase) -> Result<DatabaseHandle>;

    async fn create_application(&mut self, application: NewApplication)
        -> Result<ApplicationHandle>;

    async fn create_resource_link(&mut self, link: NewResourceLink) -> Result<ResourceLinkHandle>;

    async fn set_env_variable(&mut self, variable: NewEnvVariable) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

#[async_trait]
pub trait DestinationResolver: Send + Sync {
    async fn resolve(&self, destination_id: &str) -> Result<Destination>;
}

#[async_trait]
pub trait AddressGenerator: Send + Sync {
    /// Public address for `app_name` in `environment`
    async fn generate(&self, app_name: &str, environment: &Environment) -> Result<String>;
}

/// Resolves a single known destination and rejects every other id
#[derive(Debug, Clone)]
pub struct StaticDestinationResolver {
    destination: Destination,
}

impl StaticDestinationResolver {
    pub fn new(destination: Destination) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl DestinationResolver for StaticDestinationResolver {
    async fn resolve(&self, destination_id: &str) -> Result<Destination> {
        if destination_id != self.destination.id {
            bail!("Unknown destination: {}", destination_id);
        }
        Ok(self.destination.clone())
    }
}

/// `http://{app}-{environment}.{base_domain}`, lowercased with unsafe characters dashed
#[derive(Debug, Clone)]
pub struct SubdomainAddressGenerator {
    base_domain: String,
}

impl SubdomainAddressGenerator {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
        }
    }
}

fn dns_label(raw: &str) -> String {
    let label: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    label.trim_matches('-').to_string()
}

#[async_trait]
impl AddressGenerator for SubdomainAddressGenerator {
    async fn generate(&self, app_name: &str, environment: &Environment) -> Result<String> {
        let app = dns_label(app_name);
        if app.is_empty() {
            bail!("Cannot derive a host name from app name '{}'", app_name);
        }
        Ok(format!(
            "http://{}-{}.{}",
            app,
            dns_label(&environment.name),
            self.base_domain
        ))
    }
}
