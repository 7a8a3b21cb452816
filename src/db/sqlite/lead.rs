//! SQLite LeadRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use super::schema::SchemaCache;
use crate::db::schema::{LEADS_TABLE, LeadColumn, PUBLIC_COLUMNS};
use crate::db::{
    DbError, DbResult, Lead, LeadQuery, LeadRepository, LeadSummary, ListResult, ResolvedSchema,
};

/// SQLx-backed lead repository.
pub struct SqliteLeadRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
    pub(crate) schema: &'a SchemaCache,
}

impl<'a> LeadRepository for SqliteLeadRepository<'a> {
    async fn insert(&self, lead: &Lead) -> DbResult<()> {
        let schema = self.schema.resolve(self.pool).await?;

        match insert_row(self.pool, &schema, lead).await {
            Err(DbError::TableMissing { .. }) => {
                warn!("leads table disappeared, recreating before insert");
                self.schema.invalidate().await;
                let schema = self.schema.resolve(self.pool).await?;
                insert_row(self.pool, &schema, lead).await
            }
            other => other,
        }
    }

    async fn list(&self, query: &LeadQuery) -> DbResult<ListResult<LeadSummary>> {
        let schema = self.schema.resolve(self.pool).await?;

        let select = PUBLIC_COLUMNS
            .iter()
            .map(|&c| {
                if schema.can_read(c) {
                    quote(c)
                } else {
                    format!("NULL AS {}", quote(c))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        // Equal timestamps fall back to insertion order.
        let order_clause = if schema.can_read(LeadColumn::CreatedAt) {
            "ORDER BY created_at DESC, rowid DESC"
        } else {
            "ORDER BY rowid DESC"
        };

        let sql = format!(
            "SELECT {} FROM {} {} LIMIT ?",
            select, LEADS_TABLE, order_clause
        );

        let rows = sqlx::query(&sql)
            .bind(i64::from(query.limit))
            .fetch_all(self.pool)
            .await
            .map_err(|e| DbError::from_query(LEADS_TABLE, e))?;

        let items = rows
            .iter()
            .map(summary_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        let total = if query.include_total {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", LEADS_TABLE))
                .fetch_one(self.pool)
                .await
                .map_err(|e| DbError::from_query(LEADS_TABLE, e))?;
            Some(count as usize)
        } else {
            None
        };

        Ok(ListResult {
            items,
            total,
            limit: query.limit,
        })
    }
}

async fn insert_row(pool: &SqlitePool, schema: &ResolvedSchema, lead: &Lead) -> DbResult<()> {
    let columns = schema
        .insert_columns
        .iter()
        .map(|&c| quote(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; schema.insert_columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        LEADS_TABLE, columns, placeholders
    );

    let mut statement = sqlx::query(&sql);
    for &column in &schema.insert_columns {
        statement = statement.bind(column_value(lead, column));
    }

    statement
        .execute(pool)
        .await
        .map_err(|e| DbError::from_query(LEADS_TABLE, e))?;

    Ok(())
}

fn column_value(lead: &Lead, column: LeadColumn) -> Option<&str> {
    match column {
        LeadColumn::Id => Some(&lead.id),
        LeadColumn::Name => Some(&lead.name),
        LeadColumn::Email => lead.email.as_deref(),
        LeadColumn::Phone => lead.phone.as_deref(),
        LeadColumn::Product => Some(&lead.product),
        LeadColumn::View => Some(&lead.view),
        LeadColumn::CreatedAt => Some(&lead.created_at),
        LeadColumn::IpLast4 => Some(&lead.ip_last4),
        LeadColumn::UaHash => Some(&lead.ua_hash),
        LeadColumn::UtmSource => lead.utm_source.as_deref(),
        LeadColumn::UtmCampaign => lead.utm_campaign.as_deref(),
        LeadColumn::Notes => lead.notes.as_deref(),
    }
}

fn summary_from_row(row: &SqliteRow) -> DbResult<LeadSummary> {
    let text = |column: &str| -> DbResult<Option<String>> {
        row.try_get::<Option<String>, _>(column)
            .map_err(|e| DbError::Database {
                message: e.to_string(),
            })
    };

    Ok(LeadSummary {
        id: text("id")?.unwrap_or_default(),
        name: text("name")?.unwrap_or_default(),
        email: text("email")?,
        phone: text("phone")?,
        product: text("product")?,
        view: text("view")?,
        created_at: text("created_at")?,
    })
}

fn quote(column: LeadColumn) -> String {
    format!("\"{}\"", column.name())
}
