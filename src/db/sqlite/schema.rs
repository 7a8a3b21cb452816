//! Schema bootstrap and column introspection for SQLite.

use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::db::schema::{CREATE_CREATED_AT_INDEX, CREATE_LEADS_TABLE, LEADS_TABLE};
use crate::db::{DbError, DbResult, LeadColumn, ResolvedSchema};

/// Create the leads table if it does not exist.
pub async fn ensure_table(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(CREATE_LEADS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| DbError::Schema {
            message: e.to_string(),
        })?;
    Ok(())
}

/// Create the `created_at` index when the table has that column.
///
/// Returns `false` when the table has no `created_at` column; such tables
/// are still readable in insertion order.
pub async fn ensure_created_at_index<S: AsRef<str>>(
    pool: &SqlitePool,
    columns: &[S],
) -> DbResult<bool> {
    let created_at = LeadColumn::CreatedAt.name();
    if !columns.iter().any(|c| c.as_ref() == created_at) {
        return Ok(false);
    }

    sqlx::query(CREATE_CREATED_AT_INDEX)
        .execute(pool)
        .await
        .map_err(|e| DbError::Schema {
            message: e.to_string(),
        })?;
    Ok(true)
}

/// Column names of the leads table as the database reports them.
pub async fn table_columns(pool: &SqlitePool) -> DbResult<Vec<String>> {
    sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
        .bind(LEADS_TABLE)
        .fetch_all(pool)
        .await
        .map_err(|e| DbError::Schema {
            message: e.to_string(),
        })
}

/// Process-wide cache of the resolved schema.
///
/// Filled on first use, after making sure the table exists.
#[derive(Debug, Default)]
pub struct SchemaCache {
    resolved: RwLock<Option<ResolvedSchema>>,
}

impl SchemaCache {
    /// Return the cached schema, bootstrapping the table on first call.
    pub async fn resolve(&self, pool: &SqlitePool) -> DbResult<ResolvedSchema> {
        if let Some(schema) = self.resolved.read().await.as_ref() {
            return Ok(schema.clone());
        }

        let mut slot = self.resolved.write().await;
        if let Some(schema) = slot.as_ref() {
            return Ok(schema.clone());
        }

        ensure_table(pool).await?;
        let columns = table_columns(pool).await?;
        if columns.is_empty() {
            return Err(DbError::Schema {
                message: format!("table '{}' reports no columns", LEADS_TABLE),
            });
        }

        if !ensure_created_at_index(pool, &columns).await? {
            warn!("leads table has no created_at column, listing in insertion order");
        }

        let schema = ResolvedSchema::resolve(&columns);
        match schema.version {
            Some(version) => info!(version, "resolved leads schema"),
            None => warn!(
                columns = ?schema.insert_columns,
                "leads table matches no known schema version, writing intersecting columns"
            ),
        }

        *slot = Some(schema.clone());
        Ok(schema)
    }

    /// Forget the cached schema so the next call re-checks the table.
    pub async fn invalidate(&self) {
        *self.resolved.write().await = None;
    }

    /// The cached schema, if resolved already.
    pub async fn cached(&self) -> Option<ResolvedSchema> {
        self.resolved.read().await.clone()
    }
}
