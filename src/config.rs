use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::Result;

/// Environment variable names read by [`TestDbConfig::from_env`].
pub const TEST_DB_ENV_VARS: [&str; 8] = [
    "TEST_DB_PASS",
    "TEST_DB_USER",
    "TEST_DB_NAME",
    "TEST_DB_TABLE_PREFIX",
    "TEST_DB_DRIVER",
    "TEST_DB_PORT",
    "TEST_DB_SCHEMA",
    "TEST_DB_SERVER",
];

const DEFAULT_DB_PORT: u16 = 5432;

/// Database connection settings for a test run, sourced from the process
/// environment at bootstrap time.
///
/// Missing variables surface as empty fields rather than errors; anything
/// beyond that is validated by the connection layer when the pool is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDbConfig {
    pub password: String,
    pub user: String,
    pub database: String,
    pub table_prefix: String,
    pub driver: String,
    pub port: u16,
    pub schema: String,
    pub server: String,
}

impl TestDbConfig {
    /// Reads the eight `TEST_DB_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            password: env_or_empty("TEST_DB_PASS"),
            user: env_or_empty("TEST_DB_USER"),
            database: env_or_empty("TEST_DB_NAME"),
            table_prefix: env_or_empty("TEST_DB_TABLE_PREFIX"),
            driver: env_or_empty("TEST_DB_DRIVER"),
            port: env_or_empty("TEST_DB_PORT")
                .parse()
                .unwrap_or(DEFAULT_DB_PORT),
            schema: env_or_empty("TEST_DB_SCHEMA"),
            server: env_or_empty("TEST_DB_SERVER"),
        }
    }

    /// Renders the connection URL handed to the pool.
    ///
    /// Driver and server fall back to `postgres`/`localhost` when unset; a
    /// non-empty schema is passed through as the connection's search path.
    pub fn connection_url(&self) -> String {
        let driver = non_empty_or(&self.driver, "postgres");
        let server = non_empty_or(&self.server, "localhost");

        let mut url = format!(
            "{driver}://{}:{}@{server}:{}/{}",
            self.user, self.password, self.port, self.database
        );
        if !self.schema.is_empty() {
            url.push_str("?options=-csearch_path%3D");
            url.push_str(&self.schema);
        }
        url
    }

    /// Applies the configured table prefix to a base table name.
    pub fn prefixed(&self, base: &str) -> String {
        format!("{}{}", self.table_prefix, base)
    }
}

fn env_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Reference to an installable plugin in the harness configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct PluginRef {
    pub handle: String,
}

/// Reference to a registered migration plus its opaque parameter bag.
#[derive(Debug, Deserialize, Clone)]
pub struct MigrationRef {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Reference to an application module registered at warm-up.
#[derive(Debug, Deserialize, Clone)]
pub struct ModuleRef {
    pub handle: String,
    pub class: String,
}

/// Toggles for the database setup steps; an absent flag means skip.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DbSetupFlags {
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub setup_core: bool,
    #[serde(default)]
    pub setup_migrations: bool,
}

/// Configuration surface consumed by the bootstrap sequencer.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct HarnessSettings {
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
    #[serde(default)]
    pub migrations: Vec<MigrationRef>,
    #[serde(default)]
    pub modules: Vec<ModuleRef>,
    #[serde(default)]
    pub db_setup: DbSetupFlags,
}

impl HarnessSettings {
    pub fn new() -> Result<Self> {
        let settings = Config::builder()
            // Start with default values
            .set_default("db_setup.clean", false)?
            .set_default("db_setup.setup_core", false)?
            .set_default("db_setup.setup_migrations", false)?
            // Add configuration file if it exists
            .add_source(File::with_name("config/test").required(false))
            .add_source(File::with_name("config/test.local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("QUILL").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}
