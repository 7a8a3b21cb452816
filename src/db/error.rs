//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The error types are storage-backend agnostic.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Table '{table}' does not exist")]
    #[diagnostic(code(leadgress::db::table_missing))]
    TableMissing { table: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(leadgress::db::database_error))]
    Database { message: String },

    #[error("Schema error: {message}")]
    #[diagnostic(code(leadgress::db::schema_error))]
    Schema { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(leadgress::db::connection_error))]
    Connection { message: String },
}

impl DbError {
    /// Classify a driver error, separating "no such table" from other failures.
    pub(crate) fn from_query(table: &str, e: sqlx::Error) -> Self {
        let message = e.to_string();
        if message.contains("no such table") {
            DbError::TableMissing {
                table: table.to_string(),
            }
        } else {
            DbError::Database { message }
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
