//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for lead storage,
//! allowing the HTTP layer to stay agnostic of the storage backend.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Lead, LeadSummary) and query types
//! - `repository`: Trait definitions for data access
//! - `schema`: Known schema versions and column reconciliation
//! - `sqlite`: SQLx-backed SQLite implementation

mod error;
mod models;
mod repository;
pub mod schema;
pub mod sqlite;
pub mod utils;


pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use schema::{LeadColumn, ResolvedSchema, SchemaVersion};
pub use sqlite::SqliteDatabase;
