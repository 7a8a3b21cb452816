//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing the HTTP layer.

use std::future::Future;

use crate::db::{DbResult, Lead, LeadQuery, LeadSummary, ListResult, ResolvedSchema};

/// Repository for Lead operations.
pub trait LeadRepository: Send + Sync {
    /// Persist one lead. The table is created first if it does not exist yet.
    fn insert(&self, lead: &Lead) -> impl Future<Output = DbResult<()>> + Send;

    /// Most recent leads first, public-safe columns only.
    fn list(
        &self,
        query: &LeadQuery,
    ) -> impl Future<Output = DbResult<ListResult<LeadSummary>>> + Send;
}

/// Combined database interface.
pub trait Database: Send + Sync {
    type Leads<'a>: LeadRepository
    where
        Self: 'a;

    /// Ensure the leads table exists and resolve its schema version.
    fn migrate(&self) -> impl Future<Output = DbResult<ResolvedSchema>> + Send;

    /// Get the lead repository.
    fn leads(&self) -> Self::Leads<'_>;
}
