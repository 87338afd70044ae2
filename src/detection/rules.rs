//! Ordered rule tables used by dependency analysis
//!
//! Every table is evaluated top to bottom and the first matching row wins. The
//! defaults can be swapped through the [`DependencyAnalyzer`](super::DependencyAnalyzer)
//! builder methods.

use crate::detection::types::{AppDependency, Ecosystem, EnvCategory};
use crate::stack::{DatabaseType, DependencyPattern};

/// Env var keys containing any fragment fall into `category`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvCategoryRule {
    pub category: EnvCategory,
    pub fragments: Vec<String>,
}

impl EnvCategoryRule {
    pub fn new(category: EnvCategory, fragments: &[&str]) -> Self {
        Self {
            category,
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_uppercase();
        self.fragments.iter().any(|f| key.contains(f.as_str()))
    }
}

pub fn default_env_category_rules() -> Vec<EnvCategoryRule> {
    vec![
        EnvCategoryRule::new(
            EnvCategory::Database,
            &["DATABASE", "DB_", "_DB", "POSTGRES", "MYSQL", "MONGO"],
        ),
        EnvCategoryRule::new(EnvCategory::Cache, &["REDIS", "CACHE", "MEMCACHE"]),
        EnvCategoryRule::new(
            EnvCategory::Secret,
            &["SECRET", "_KEY", "_TOKEN", "PASSWORD", "_SALT", "PRIVATE"],
        ),
    ]
}

pub fn categorize(rules: &[EnvCategoryRule], key: &str) -> EnvCategory {
    rules
        .iter()
        .find(|rule| rule.matches(key))
        .map(|rule| rule.category)
        .unwrap_or(EnvCategory::Other)
}

/// Env var name prefixes that reveal a third-party service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRule {
    pub service_type: String,
    pub description: String,
    pub prefixes: Vec<String>,
}

impl ServiceRule {
    pub fn new(service_type: &str, description: &str, prefixes: &[&str]) -> Self {
        Self {
            service_type: service_type.to_string(),
            description: description.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_uppercase();
        self.prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

pub fn default_service_rules() -> Vec<ServiceRule> {
    vec![
        ServiceRule::new("payments", "Payment processing (Stripe)", &["STRIPE_"]),
        ServiceRule::new(
            "email",
            "Transactional email",
            &["SENDGRID_", "MAILGUN_", "SMTP_", "MAIL_"],
        ),
        ServiceRule::new("object-storage", "Object storage (S3 compatible)", &["AWS_", "S3_"]),
        ServiceRule::new("error-tracking", "Error tracking (Sentry)", &["SENTRY_"]),
        ServiceRule::new("sms", "SMS delivery (Twilio)", &["TWILIO_"]),
        ServiceRule::new("realtime", "Realtime messaging (Pusher)", &["PUSHER_"]),
        ServiceRule::new("search", "Hosted search (Algolia)", &["ALGOLIA_"]),
        ServiceRule::new("ai", "AI API (OpenAI)", &["OPENAI_"]),
        ServiceRule::new("message-broker", "Message broker (RabbitMQ/AMQP)", &["RABBITMQ_", "AMQP_"]),
        ServiceRule::new("search", "Search engine (Elasticsearch)", &["ELASTICSEARCH_"]),
    ]
}

/// A client library whose presence implies a database engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRule {
    pub pattern: DependencyPattern,
    pub db_type: DatabaseType,
}

fn driver(ecosystem: Ecosystem, name: &str, db_type: DatabaseType) -> DriverRule {
    DriverRule {
        pattern: DependencyPattern::exact(ecosystem, name),
        db_type,
    }
}

fn driver_prefix(ecosystem: Ecosystem, name: &str, db_type: DatabaseType) -> DriverRule {
    DriverRule {
        pattern: DependencyPattern::prefix(ecosystem, name),
        db_type,
    }
}

pub fn default_driver_rules() -> Vec<DriverRule> {
    use DatabaseType::*;
    use Ecosystem::*;

    vec![
        driver(Npm, "pg", Postgresql),
        driver(Npm, "pg-promise", Postgresql),
        driver(Npm, "postgres", Postgresql),
        driver(Npm, "mysql", Mysql),
        driver(Npm, "mysql2", Mysql),
        driver(Npm, "mariadb", Mariadb),
        driver(Npm, "mongodb", Mongodb),
        driver(Npm, "mongoose", Mongodb),
        driver(Npm, "redis", Redis),
        driver(Npm, "ioredis", Redis),
        driver(Npm, "@clickhouse/client", Clickhouse),
        driver(Pypi, "psycopg2", Postgresql),
        driver(Pypi, "psycopg2-binary", Postgresql),
        driver(Pypi, "psycopg", Postgresql),
        driver(Pypi, "asyncpg", Postgresql),
        driver(Pypi, "mysqlclient", Mysql),
        driver(Pypi, "pymysql", Mysql),
        driver(Pypi, "pymongo", Mongodb),
        driver(Pypi, "motor", Mongodb),
        driver(Pypi, "mongoengine", Mongodb),
        driver(Pypi, "redis", Redis),
        driver(Pypi, "clickhouse-connect", Clickhouse),
        driver(Pypi, "clickhouse-driver", Clickhouse),
        driver(Rubygems, "pg", Postgresql),
        driver(Rubygems, "mysql2", Mysql),
        driver(Rubygems, "mongoid", Mongodb),
        driver(Rubygems, "redis", Redis),
        driver(Composer, "predis/predis", Redis),
        driver(Composer, "mongodb/mongodb", Mongodb),
        driver(Go, "github.com/lib/pq", Postgresql),
        driver_prefix(Go, "github.com/jackc/pgx", Postgresql),
        driver(Go, "github.com/go-sql-driver/mysql", Mysql),
        driver(Go, "go.mongodb.org/mongo-driver", Mongodb),
        driver_prefix(Go, "github.com/redis/go-redis", Redis),
        driver_prefix(Go, "github.com/go-redis/redis", Redis),
        driver_prefix(Go, "github.com/clickhouse/clickhouse-go", Clickhouse),
        driver(Cargo, "tokio-postgres", Postgresql),
        driver(Cargo, "postgres", Postgresql),
        driver(Cargo, "mongodb", Mongodb),
        driver(Cargo, "redis", Redis),
        driver(Cargo, "clickhouse", Clickhouse),
        driver(Maven, "org.postgresql:postgresql", Postgresql),
        driver(Maven, "com.mysql:mysql-connector-j", Mysql),
        driver(Maven, "mysql:mysql-connector-java", Mysql),
        driver(Maven, "org.mariadb.jdbc:mariadb-java-client", Mariadb),
        driver_prefix(Maven, "org.mongodb:", Mongodb),
        driver(Maven, "redis.clients:jedis", Redis),
        driver(Maven, "io.lettuce:lettuce-core", Redis),
        driver(Maven, "com.clickhouse:clickhouse-jdbc", Clickhouse),
        driver(Hex, "postgrex", Postgresql),
        driver(Hex, "myxql", Mysql),
        driver(Hex, "mongodb_driver", Mongodb),
        driver(Hex, "redix", Redis),
    ]
}

/// First driver rule matching any dependency, per database type, in dependency order
pub fn implied_by_drivers<'a>(
    rules: &'a [DriverRule],
    deps: &'a [AppDependency],
) -> Vec<(&'a AppDependency, DatabaseType)> {
    let mut found: Vec<(&AppDependency, DatabaseType)> = Vec::new();
    for dep in deps {
        if let Some(rule) = rules.iter().find(|rule| rule.pattern.matches(dep)) {
            if !found.iter().any(|(_, t)| *t == rule.db_type) {
                found.push((dep, rule.db_type.clone()));
            }
        }
    }
    found
}

/// Libraries for embedded file-based storage
pub fn file_storage_drivers() -> Vec<DependencyPattern> {
    use Ecosystem::*;

    vec![
        DependencyPattern::exact(Npm, "sqlite3"),
        DependencyPattern::exact(Npm, "better-sqlite3"),
        DependencyPattern::exact(Npm, "sqlite"),
        DependencyPattern::exact(Pypi, "aiosqlite"),
        DependencyPattern::exact(Rubygems, "sqlite3"),
        DependencyPattern::exact(Go, "github.com/mattn/go-sqlite3"),
        DependencyPattern::exact(Go, "modernc.org/sqlite"),
        DependencyPattern::exact(Cargo, "rusqlite"),
        DependencyPattern::exact(Maven, "org.xerial:sqlite-jdbc"),
        DependencyPattern::exact(Hex, "ecto_sqlite3"),
        DependencyPattern::exact(Hex, "exqlite"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        database_url = { "DATABASE_URL", EnvCategory::Database },
        db_host = { "DB_HOST", EnvCategory::Database },
        mongo_uri = { "MONGO_URI", EnvCategory::Database },
        postgres_password = { "POSTGRES_PASSWORD", EnvCategory::Database },
        redis_url = { "REDIS_URL", EnvCategory::Cache },
        cache_ttl = { "CACHE_TTL", EnvCategory::Cache },
        api_key = { "STRIPE_API_KEY", EnvCategory::Secret },
        jwt_secret = { "JWT_SECRET", EnvCategory::Secret },
        github_token = { "GITHUB_TOKEN", EnvCategory::Secret },
        port = { "PORT", EnvCategory::Other },
        node_env = { "NODE_ENV", EnvCategory::Other },
        lowercase = { "redis_host", EnvCategory::Cache },
    )]
    fn env_category_table(key: &str, expected: EnvCategory) {
        assert_eq!(categorize(&default_env_category_rules(), key), expected);
    }

    #[test]
    fn test_category_precedence_is_table_order() {
        // Matches both database (`_DB`) and cache (`REDIS`); database is listed first
        assert_eq!(
            categorize(&default_env_category_rules(), "REDIS_DB"),
            EnvCategory::Database
        );

        let reordered = vec![
            EnvCategoryRule::new(EnvCategory::Cache, &["REDIS"]),
            EnvCategoryRule::new(EnvCategory::Database, &["_DB"]),
        ];
        assert_eq!(categorize(&reordered, "REDIS_DB"), EnvCategory::Cache);
    }

    #[test]
    fn test_service_prefixes() {
        let rules = default_service_rules();
        let find = |key: &str| {
            rules
                .iter()
                .find(|r| r.matches(key))
                .map(|r| r.service_type.as_str())
        };

        assert_eq!(find("STRIPE_SECRET_KEY"), Some("payments"));
        assert_eq!(find("SMTP_HOST"), Some("email"));
        assert_eq!(find("AWS_ACCESS_KEY_ID"), Some("object-storage"));
        assert_eq!(find("ELASTICSEARCH_URL"), Some("search"));
        assert_eq!(find("AMQP_URL"), Some("message-broker"));
        assert_eq!(find("PORT"), None);
    }

    #[test]
    fn test_driver_implication_one_per_type() {
        let deps = vec![
            AppDependency::new("express", None, Ecosystem::Npm),
            AppDependency::new("pg", None, Ecosystem::Npm),
            AppDependency::new("postgres", None, Ecosystem::Npm),
            AppDependency::new("ioredis", None, Ecosystem::Npm),
        ];
        let rules = default_driver_rules();

        let implied = implied_by_drivers(&rules, &deps);
        let summary: Vec<_> = implied
            .iter()
            .map(|(dep, t)| (dep.name.as_str(), t.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![("pg", DatabaseType::Postgresql), ("ioredis", DatabaseType::Redis)]
        );
    }
}
