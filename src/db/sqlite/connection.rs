//! SQLite database connection and schema management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use super::lead::SqliteLeadRepository;
use super::schema::SchemaCache;
use crate::db::{Database, DbError, DbResult, ResolvedSchema};

/// SQLite database implementation.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub struct SqliteDatabase {
    pool: SqlitePool,
    schema: SchemaCache,
}

impl SqliteDatabase {
    /// Open a database at the given path, creating the file if needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self::from_pool(pool))
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Every SQLite connection gets its own in-memory database, so the pool
    /// is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> DbResult<Self> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            schema: SchemaCache::default(),
        }
    }

    /// Get the underlying connection pool.
    ///
    /// This is useful for testing and advanced operations that need
    /// direct database access.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the resolved-schema cache.
    pub fn schema(&self) -> &SchemaCache {
        &self.schema
    }
}

impl Database for SqliteDatabase {
    type Leads<'a> = SqliteLeadRepository<'a>;

    async fn migrate(&self) -> DbResult<ResolvedSchema> {
        self.schema.invalidate().await;
        self.schema.resolve(&self.pool).await
    }

    fn leads(&self) -> Self::Leads<'_> {
        SqliteLeadRepository {
            pool: &self.pool,
            schema: &self.schema,
        }
    }
}
