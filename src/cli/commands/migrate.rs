use std::path::Path;

use crate::cli::error::CliResult;
use crate::cli::utils::open_database;
use crate::db::{Database, ResolvedSchema};

/// Ensure the leads table exists and describe the schema in use.
pub async fn migrate(path: &Path) -> CliResult<String> {
    let db = open_database(path).await?;
    let schema = db.migrate().await?;
    Ok(describe_schema(&schema))
}

pub(crate) fn describe_schema(schema: &ResolvedSchema) -> String {
    match schema.version {
        Some(version) => format!("Leads table ready (schema {})", version),
        None => format!(
            "Leads table ready (no known schema version, writing columns: {})",
            schema
                .insert_columns
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
