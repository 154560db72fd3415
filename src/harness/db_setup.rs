//! Database setup operations for a test run
//!
//! `TestSetup` owns the destructive operations the bootstrap sequencer
//! toggles: wiping the current schema, creating the baseline tables, and the
//! post-test purge of the search index (whose storage does not participate in
//! transactional rollback, so leftover rows would leak across tests).

use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

use crate::domain::ElementId;
use crate::{Error, Result};

const SEARCH_INDEX_TABLE: &str = "searchindex";

/// Destructive schema operations against the test database
pub struct TestSetup {
    pool: PgPool,
}

impl TestSetup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pool)
            .await?;

        let health_check: i32 = row.try_get("health_check")?;

        if health_check == 1 {
            Ok(())
        } else {
            Err(Error::invalid_config("database health check failed"))
        }
    }

    /// Drops every table in the current schema.
    #[instrument(skip(self))]
    pub async fn clean_db(&self) -> Result<()> {
        let rows = sqlx::query("SELECT tablename FROM pg_tables WHERE schemaname = current_schema()")
            .fetch_all(&self.pool)
            .await?;

        for row in rows {
            let table: String = row.try_get("tablename")?;
            debug!(table, "dropping table");
            sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{table}" CASCADE"#))
                .execute(&self.pool)
                .await?;
        }

        info!("cleaned test database");
        Ok(())
    }

    /// Creates the baseline schema (sections, entries, search index) and the
    /// reserved seed element row.
    #[instrument(skip(self))]
    pub async fn setup_core_db(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS sections (
                id BIGSERIAL PRIMARY KEY,
                handle VARCHAR(64) NOT NULL,
                CONSTRAINT sections_handle_unq UNIQUE (handle)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS entries (
                id BIGSERIAL PRIMARY KEY,
                section_id BIGINT NOT NULL REFERENCES sections (id) ON DELETE CASCADE
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{SEARCH_INDEX_TABLE}" (
                element_id BIGINT NOT NULL,
                keywords TEXT NOT NULL DEFAULT ''
            )"#
        ))
        .execute(&self.pool)
        .await?;

        // The seed element is exempt from post-test cleanup.
        sqlx::query(&format!(
            r#"INSERT INTO "{SEARCH_INDEX_TABLE}" (element_id, keywords)
                SELECT $1, ''
                WHERE NOT EXISTS (
                    SELECT 1 FROM "{SEARCH_INDEX_TABLE}" WHERE element_id = $1
                )"#
        ))
        .bind(ElementId::seed().into_inner())
        .execute(&self.pool)
        .await?;

        info!("baseline schema ready");
        Ok(())
    }

    /// Deletes every search-index row except the reserved seed element's.
    #[instrument(skip(self))]
    pub async fn purge_search_index(&self) -> Result<()> {
        let result = sqlx::query(&format!(
            r#"DELETE FROM "{SEARCH_INDEX_TABLE}" WHERE element_id <> $1"#
        ))
        .bind(ElementId::seed().into_inner())
        .execute(&self.pool)
        .await?;

        debug!(rows = result.rows_affected(), "purged search index");
        Ok(())
    }
}
