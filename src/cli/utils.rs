//! Shared utilities for CLI commands

use std::path::{Path, PathBuf};

use tabled::{Table, settings::Style};
use tracing::info;

use super::error::{CliError, CliResult};
use crate::db::{Database, SqliteDatabase};

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional value for display
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}

/// Resolve the database path: CLI flag first, then config.
pub fn require_db_path(flag: Option<PathBuf>, configured: Option<PathBuf>) -> CliResult<PathBuf> {
    flag.or(configured).ok_or(CliError::NoDatabase)
}

/// Open (creating if needed) the SQLite database and resolve its schema.
pub async fn open_database(path: &Path) -> CliResult<SqliteDatabase> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    info!("Opening database at {:?}", path);
    let db = SqliteDatabase::open(path).await?;
    let schema = db.migrate().await?;
    info!(version = ?schema.version, "Database schema ready");
    Ok(db)
}
