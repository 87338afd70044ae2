//! In-memory unit of work
//!
//! Writes are staged per transaction and only appended to the shared state on
//! commit. A failure point can be armed to make one operation fail, which is how
//! rollback behaviour is exercised.

use super::store::{ProvisioningTransaction, UnitOfWork};
use super::types::{
    ApplicationHandle, DatabaseHandle, NewApplication, NewDatabase, NewEnvVariable,
    NewResourceLink, ResourceLinkHandle,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Operation at which an armed store fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    CreateDatabase,
    CreateApplication,
    CreateResourceLink,
    SetEnvVariable,
    Commit,
}

/// Committed records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub databases: Vec<(String, NewDatabase)>,
    pub applications: Vec<(String, NewApplication)>,
    pub links: Vec<ResourceLinkHandle>,
    pub env_variables: Vec<NewEnvVariable>,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
            && self.applications.is_empty()
            && self.links.is_empty()
            && self.env_variables.is_empty()
    }

    fn append(&mut self, other: StoreSnapshot) {
        self.databases.extend(other.databases);
        self.applications.extend(other.applications);
        self.links.extend(other.links);
        self.env_variables.extend(other.env_variables);
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    committed: Arc<Mutex<StoreSnapshot>>,
    failure: Option<FailurePoint>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transaction from this store fails at `point`
    pub fn with_failure(mut self, point: FailurePoint) -> Self {
        self.failure = Some(point);
        self
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(lock(&self.committed)?.clone())
    }
}

fn lock(state: &Mutex<StoreSnapshot>) -> Result<MutexGuard<'_, StoreSnapshot>> {
    state
        .lock()
        .map_err(|_| anyhow!("In-memory store lock poisoned"))
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn ProvisioningTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            committed: self.committed.clone(),
            staged: StoreSnapshot::default(),
            failure: self.failure,
            finished: false,
        }))
    }
}

struct InMemoryTransaction {
    committed: Arc<Mutex<StoreSnapshot>>,
    staged: StoreSnapshot,
    failure: Option<FailurePoint>,
    finished: bool,
}

impl InMemoryTransaction {
    fn check(&self, point: FailurePoint) -> Result<()> {
        if self.finished {
            bail!("Transaction already finished");
        }
        if self.failure == Some(point) {
            bail!("Injected failure at {:?}", point);
        }
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl ProvisioningTransaction for InMemoryTransaction {
    async fn create_database(&mut self, database: NewDatabase) -> Result<DatabaseHandle> {
        self.check(FailurePoint::CreateDatabase)?;
        let handle = DatabaseHandle {
            id: new_id(),
            name: database.name.clone(),
            db_type: database.db_type.clone(),
            internal_url: database.internal_url.clone(),
        };
        self.staged.databases.push((handle.id.clone(), database));
        Ok(handle)
    }

    async fn create_application(
        &mut self,
        application: NewApplication,
    ) -> Result<ApplicationHandle> {
        self.check(FailurePoint::CreateApplication)?;
        let handle = ApplicationHandle {
            id: new_id(),
            name: application.name.clone(),
            fqdn: application.fqdn.clone(),
            monorepo_group_id: application.monorepo_group_id.clone(),
        };
        self.staged.applications.push((handle.id.clone(), application));
        Ok(handle)
    }

    async fn create_resource_link(&mut self, link: NewResourceLink) -> Result<ResourceLinkHandle> {
        self.check(FailurePoint::CreateResourceLink)?;
        let handle = ResourceLinkHandle {
            id: new_id(),
            database_id: link.database_id,
            application_id: link.application_id,
            env_var_name: link.env_var_name,
        };
        self.staged.links.push(handle.clone());
        Ok(handle)
    }

    async fn set_env_variable(&mut self, variable: NewEnvVariable) -> Result<()> {
        self.check(FailurePoint::SetEnvVariable)?;
        self.staged.env_variables.push(variable);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.check(FailurePoint::Commit)?;
        let staged = std::mem::take(&mut self.staged);
        lock(&self.committed)?.append(staged);
        self.finished = true;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.finished {
            bail!("Transaction already finished");
        }
        self.staged = StoreSnapshot::default();
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(database_id: &str) -> NewResourceLink {
        NewResourceLink {
            database_id: database_id.to_string(),
            application_id: "app".to_string(),
            env_var_name: "DATABASE_URL".to_string(),
            auto_inject: true,
            use_internal_address: true,
        }
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.create_resource_link(link("db-1")).await.unwrap();
        assert!(store.snapshot().unwrap().is_empty());

        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().unwrap().links.len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_resource_link(link("db-1")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.snapshot().unwrap().is_empty());
        assert!(tx.commit().await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new().with_failure(FailurePoint::SetEnvVariable);
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .set_env_variable(NewEnvVariable {
                application_id: "app".to_string(),
                key: "PORT".to_string(),
                value: "3000".to_string(),
                is_placeholder: false,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SetEnvVariable"));
    }
}
