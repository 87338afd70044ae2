//! Database engine registry
//!
//! Maps a [`DatabaseType`] to the engine that knows its image, port, credentials and
//! connection URL shape. Types without a registered engine are skipped by the
//! provisioner.

use super::types::DatabaseCredentials;
use crate::stack::DatabaseType;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub trait DatabaseEngine: Send + Sync {
    fn db_type(&self) -> DatabaseType;

    fn image(&self) -> &str;

    fn port(&self) -> u16;

    /// Fresh credentials for a new instance
    fn generate_credentials(&self) -> DatabaseCredentials;

    /// URL reachable from other containers on the destination network
    fn connection_url(&self, host: &str, credentials: &DatabaseCredentials) -> String;
}

/// Engine described by a URL scheme and default user/database names
#[derive(Debug, Clone)]
pub struct StandardEngine {
    db_type: DatabaseType,
    image: String,
    port: u16,
    scheme: &'static str,
    username: Option<&'static str>,
    database: Option<&'static str>,
}

impl StandardEngine {
    pub fn new(db_type: DatabaseType, image: &str, port: u16, scheme: &'static str) -> Self {
        Self {
            db_type,
            image: image.to_string(),
            port,
            scheme,
            username: None,
            database: None,
        }
    }

    pub fn with_user(mut self, username: &'static str, database: &'static str) -> Self {
        self.username = Some(username);
        self.database = Some(database);
        self
    }
}

impl DatabaseEngine for StandardEngine {
    fn db_type(&self) -> DatabaseType {
        self.db_type.clone()
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn generate_credentials(&self) -> DatabaseCredentials {
        DatabaseCredentials {
            username: self.username.map(String::from),
            password: Uuid::new_v4().simple().to_string(),
            database: self.database.map(String::from),
        }
    }

    fn connection_url(&self, host: &str, credentials: &DatabaseCredentials) -> String {
        let auth = match &credentials.username {
            Some(user) => format!("{}:{}", user, credentials.password),
            None => format!("default:{}", credentials.password),
        };
        let path = credentials
            .database
            .as_deref()
            .map(|db| format!("/{}", db))
            .unwrap_or_default();
        format!("{}://{}@{}:{}{}", self.scheme, auth, host, self.port, path)
    }
}

pub fn default_engines() -> Vec<Arc<dyn DatabaseEngine>> {
    vec![
        Arc::new(
            StandardEngine::new(DatabaseType::Postgresql, "postgres:16-alpine", 5432, "postgres")
                .with_user("postgres", "postgres"),
        ),
        Arc::new(
            StandardEngine::new(DatabaseType::Mysql, "mysql:8", 3306, "mysql")
                .with_user("mysql", "default"),
        ),
        Arc::new(
            StandardEngine::new(DatabaseType::Mariadb, "mariadb:11", 3306, "mysql")
                .with_user("mariadb", "default"),
        ),
        Arc::new(
            StandardEngine::new(DatabaseType::Mongodb, "mongo:7", 27017, "mongodb")
                .with_user("root", "admin"),
        ),
        Arc::new(StandardEngine::new(
            DatabaseType::Redis,
            "redis:7.2",
            6379,
            "redis",
        )),
        Arc::new(StandardEngine::new(
            DatabaseType::Keydb,
            "eqalpha/keydb:latest",
            6379,
            "redis",
        )),
        Arc::new(StandardEngine::new(
            DatabaseType::Dragonfly,
            "docker.dragonflydb.io/dragonflydb/dragonfly",
            6379,
            "redis",
        )),
        Arc::new(
            StandardEngine::new(
                DatabaseType::Clickhouse,
                "clickhouse/clickhouse-server:24",
                8123,
                "clickhouse",
            )
            .with_user("default", "default"),
        ),
    ]
}

#[derive(Clone, Default)]
pub struct DatabaseEngineRegistry {
    engines: HashMap<DatabaseType, Arc<dyn DatabaseEngine>>,
}

impl DatabaseEngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for engine in default_engines() {
            registry.register(engine);
        }
        registry
    }

    /// Replaces any engine already registered for the same type
    pub fn register(&mut self, engine: Arc<dyn DatabaseEngine>) {
        self.engines.insert(engine.db_type(), engine);
    }

    pub fn get(&self, db_type: &DatabaseType) -> Option<Arc<dyn DatabaseEngine>> {
        self.engines.get(db_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_known_type() {
        let registry = DatabaseEngineRegistry::with_defaults();
        assert_eq!(registry.len(), 8);
        for db_type in DatabaseType::all_variants() {
            assert!(registry.get(db_type).is_some(), "missing engine for {}", db_type);
        }
        assert!(registry
            .get(&DatabaseType::Custom("cockroach".to_string()))
            .is_none());
    }

    #[test]
    fn test_postgres_url() {
        let registry = DatabaseEngineRegistry::with_defaults();
        let engine = registry.get(&DatabaseType::Postgresql).unwrap();
        let credentials = engine.generate_credentials();

        assert_eq!(credentials.username.as_deref(), Some("postgres"));
        assert_eq!(credentials.password.len(), 32);

        let url = engine.connection_url("shop-db", &credentials);
        assert_eq!(
            url,
            format!("postgres://postgres:{}@shop-db:5432/postgres", credentials.password)
        );
    }

    #[test]
    fn test_redis_url_has_no_database_path() {
        let registry = DatabaseEngineRegistry::with_defaults();
        let engine = registry.get(&DatabaseType::Redis).unwrap();
        let credentials = engine.generate_credentials();
        let url = engine.connection_url("cache", &credentials);
        assert!(url.starts_with("redis://default:"));
        assert!(url.ends_with("@cache:6379"));
    }

    #[test]
    fn test_passwords_are_unique() {
        let engine = StandardEngine::new(DatabaseType::Mysql, "mysql:8", 3306, "mysql");
        assert_ne!(
            engine.generate_credentials().password,
            engine.generate_credentials().password
        );
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = DatabaseEngineRegistry::with_defaults();
        registry.register(Arc::new(StandardEngine::new(
            DatabaseType::Redis,
            "valkey/valkey:8",
            6379,
            "redis",
        )));
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.get(&DatabaseType::Redis).unwrap().image(),
            "valkey/valkey:8"
        );
    }
}
