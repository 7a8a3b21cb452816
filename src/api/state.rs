//! Application state for the API server.

use std::sync::Arc;

use super::{ApiError, LeadDefaults};
use crate::db::Database;

/// Shared application state.
///
/// Generic over `D: Database` so tests and production can inject different
/// storage. The storage binding is optional: a missing binding is reported
/// per request as [`ApiError::StorageNotConfigured`].
pub struct AppState<D: Database> {
    db: Option<Arc<D>>,
    defaults: Arc<LeadDefaults>,
}

// Manual Clone impl - we only need Arc to be cloneable, not D
impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

impl<D: Database> AppState<D> {
    /// Create a new AppState with an optional storage binding.
    pub fn new(db: Option<D>, defaults: LeadDefaults) -> Self {
        Self {
            db: db.map(Arc::new),
            defaults: Arc::new(defaults),
        }
    }

    /// Get a reference to the database, or the configuration error.
    pub fn db(&self) -> Result<&D, ApiError> {
        self.db.as_deref().ok_or(ApiError::StorageNotConfigured)
    }

    /// Get the defaults for absent submission fields.
    pub fn defaults(&self) -> &LeadDefaults {
        &self.defaults
    }
}
