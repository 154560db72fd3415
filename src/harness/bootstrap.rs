//! Test-environment bootstrap sequencer
//!
//! Establishes a deterministic database state before a suite runs, and
//! rebinds/cleans around each individual test. Every step runs to completion
//! before the next; a failure aborts the remainder and propagates unchanged.

use sqlx::PgPool;
use tracing::instrument::WithSubscriber;
use tracing::subscriber::NoSubscriber;
use tracing::{info, instrument};

use crate::config::{HarnessSettings, TestDbConfig};
use crate::harness::app::TestApp;
use crate::harness::db_setup::TestSetup;
use crate::harness::migrations::MigrationRegistry;
use crate::harness::plugins::PluginRegistry;
use crate::Result;

/// Bootstrap sequencer for the integration-test environment
pub struct Bootstrap {
    settings: HarnessSettings,
    plugins: PluginRegistry,
    migrations: MigrationRegistry,
}

impl Bootstrap {
    pub fn new(settings: HarnessSettings) -> Self {
        Self {
            settings,
            plugins: PluginRegistry::new(),
            migrations: MigrationRegistry::new(),
        }
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_migrations(mut self, migrations: MigrationRegistry) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Builds a pool from the environment-sourced configuration.
    ///
    /// The pool connects lazily; a bad URL fails here, a bad server fails at
    /// first query.
    pub fn connect_from_env() -> Result<PgPool> {
        let config = TestDbConfig::from_env();
        Ok(PgPool::connect_lazy(&config.connection_url())?)
    }

    /// Runs the one-time database setup sequence.
    ///
    /// Runs under a no-op subscriber: setup shares the harness's transport
    /// stream, and stray log output would corrupt it.
    pub async fn setup_db(&self) -> Result<()> {
        self.run_setup()
            .with_subscriber(NoSubscriber::default())
            .await
    }

    async fn run_setup(&self) -> Result<()> {
        let app = TestApp::warm(&self.settings)?;

        let pool = Self::connect_from_env()?;
        app.set_db(pool.clone());

        let setup = TestSetup::new(pool);

        if self.settings.db_setup.clean {
            setup.clean_db().await?;
        }

        if self.settings.db_setup.setup_core {
            setup.setup_core_db().await?;
        }

        if self.settings.db_setup.setup_migrations {
            for migration in &self.settings.migrations {
                self.migrations
                    .validate_and_apply(setup.pool(), &migration.name, &migration.params)
                    .await?;
            }
        }

        for plugin in &self.settings.plugins {
            self.plugins.install(&app, &plugin.handle).await?;
        }

        app.teardown();
        Ok(())
    }

    /// Re-derives and re-registers the connection before each test, so
    /// connection-tracking listeners registered after initial startup observe
    /// (and can roll back) everything the test issues.
    #[instrument(skip(self, app))]
    pub async fn before_test(&self, app: &TestApp) -> Result<()> {
        let pool = Self::connect_from_env()?;
        app.set_db(pool);
        Ok(())
    }

    /// Purges the non-transactional search index after each test, keeping
    /// only the reserved seed element's rows.
    #[instrument(skip(self, app))]
    pub async fn after_test(&self, app: &TestApp) -> Result<()> {
        TestSetup::new(app.db()?).purge_search_index().await?;
        info!("search index purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbSetupFlags, MigrationRef, PluginRef};
    use crate::harness::migrations::test_support::RecordingMigration;
    use crate::{Error, Result};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn migration_settings(setup_migrations: bool) -> HarnessSettings {
        HarnessSettings {
            migrations: vec![
                MigrationRef {
                    name: "m240101_add_authors".to_string(),
                    params: json!({ "batch_size": 10 }),
                },
                MigrationRef {
                    name: "m240202_backfill_slugs".to_string(),
                    params: json!(null),
                },
                MigrationRef {
                    name: "m240303_drop_legacy".to_string(),
                    params: json!(null),
                },
            ],
            db_setup: DbSetupFlags {
                setup_migrations,
                ..DbSetupFlags::default()
            },
            ..HarnessSettings::default()
        }
    }

    fn recording_registry(
        log: &Arc<Mutex<Vec<(String, serde_json::Value)>>>,
        names: &[&str],
    ) -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        for name in names {
            registry.register(Arc::new(RecordingMigration::new(name, Arc::clone(log))));
        }
        registry
    }

    #[tokio::test]
    async fn setup_with_everything_disabled_touches_nothing() {
        // No flags, no plugins, no migrations: the sequence completes without
        // ever issuing a query, so no live database is needed.
        let bootstrap = Bootstrap::new(HarnessSettings::default());
        bootstrap.setup_db().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_apply_in_listed_order_when_enabled() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(
            &log,
            &[
                "m240101_add_authors",
                "m240202_backfill_slugs",
                "m240303_drop_legacy",
            ],
        );

        let bootstrap = Bootstrap::new(migration_settings(true)).with_migrations(registry);
        bootstrap.setup_db().await.unwrap();

        let applied = log.lock();
        let names: Vec<&str> = applied.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "m240101_add_authors",
                "m240202_backfill_slugs",
                "m240303_drop_legacy"
            ]
        );
        assert_eq!(applied[0].1, json!({ "batch_size": 10 }));
    }

    #[tokio::test]
    async fn migrations_are_skipped_when_the_flag_is_unset() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&log, &["m240101_add_authors"]);

        let bootstrap = Bootstrap::new(migration_settings(false)).with_migrations(registry);
        bootstrap.setup_db().await.unwrap();

        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_migration_aborts_the_sequence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        // Only the first configured migration is registered.
        let registry = recording_registry(&log, &["m240101_add_authors"]);

        let bootstrap = Bootstrap::new(migration_settings(true)).with_migrations(registry);
        let err = bootstrap.setup_db().await.unwrap_err();

        assert!(err.is_invalid_config());
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn unknown_plugin_handle_aborts_the_sequence() {
        let settings = HarnessSettings {
            plugins: vec![PluginRef {
                handle: "missing-plugin".to_string(),
            }],
            ..HarnessSettings::default()
        };

        let bootstrap = Bootstrap::new(settings);
        let err = bootstrap.setup_db().await.unwrap_err();
        assert!(err.is_invalid_config());
        assert!(err.to_string().contains("missing-plugin"));
    }

    #[tokio::test]
    async fn failed_plugin_install_propagates_unchanged() {
        use crate::domain::PluginHandle;
        use crate::harness::plugins::Plugin;
        use async_trait::async_trait;

        struct BrokenPlugin;

        #[async_trait]
        impl Plugin for BrokenPlugin {
            fn handle(&self) -> PluginHandle {
                PluginHandle::try_new("broken".to_string()).unwrap()
            }

            async fn install(&self, _app: &TestApp) -> Result<()> {
                Err(Error::invalid_config("install blew up"))
            }
        }

        let mut plugins = PluginRegistry::new();
        plugins.register(Arc::new(BrokenPlugin));

        let settings = HarnessSettings {
            plugins: vec![PluginRef {
                handle: "broken".to_string(),
            }],
            ..HarnessSettings::default()
        };

        let err = Bootstrap::new(settings)
            .with_plugins(plugins)
            .setup_db()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("install blew up"));
    }

    #[tokio::test]
    async fn before_test_rebinds_the_connection() {
        let bootstrap = Bootstrap::new(HarnessSettings::default());
        let app = TestApp::new();
        assert!(app.db().is_err());

        bootstrap.before_test(&app).await.unwrap();
        assert!(app.db().is_ok());
    }

    #[tokio::test]
    #[ignore = "requires database connection"]
    async fn after_test_leaves_only_the_seed_row_in_the_search_index() {
        let settings = HarnessSettings {
            db_setup: DbSetupFlags {
                clean: true,
                setup_core: true,
                setup_migrations: false,
            },
            ..HarnessSettings::default()
        };

        let bootstrap = Bootstrap::new(settings);
        bootstrap.setup_db().await.unwrap();

        let app = TestApp::new();
        bootstrap.before_test(&app).await.unwrap();

        let pool = app.db().unwrap();
        sqlx::query(r#"INSERT INTO "searchindex" (element_id, keywords) VALUES (7, 'leftover')"#)
            .execute(&pool)
            .await
            .unwrap();

        bootstrap.after_test(&app).await.unwrap();

        let rows = sqlx::query(r#"SELECT element_id FROM "searchindex" WHERE element_id <> 1"#)
            .fetch_all(&pool)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
