//! Domain models for the lead database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use serde::{Deserialize, Serialize};

/// Largest page a single list query may return.
pub const MAX_LIST_LIMIT: u32 = 200;

/// Page size used when the caller gives no usable limit.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Opaque unique identifier (UUID v4 string).
pub type Id = String;

/// A prospective-customer contact record captured from the signup form.
///
/// Optional fields are `None` when the submitter left them out; they are
/// stored as SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Id,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: String,
    pub view: String,
    /// RFC 3339 UTC timestamp, set server-side.
    pub created_at: String,
    pub ip_last4: String,
    pub ua_hash: String,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
    pub notes: Option<String>,
}

/// Public-safe projection of a lead.
///
/// Excludes the privacy-reduced request fingerprint, attribution and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: Id,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: Option<String>,
    pub view: Option<String>,
    pub created_at: Option<String>,
}

impl From<Lead> for LeadSummary {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            product: Some(lead.product),
            view: Some(lead.view),
            created_at: Some(lead.created_at),
        }
    }
}

/// Query for the most recent leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadQuery {
    /// Maximum number of items to return, already clamped to `1..=MAX_LIST_LIMIT`.
    pub limit: u32,
    /// Also count every stored row.
    pub include_total: bool,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            include_total: false,
        }
    }
}

impl LeadQuery {
    /// Build a query from a raw `limit` parameter.
    ///
    /// Missing, zero or non-numeric input falls back to the default page
    /// size; anything else is truncated and clamped to `1..=MAX_LIST_LIMIT`.
    pub fn from_raw_limit(raw: Option<&str>) -> Self {
        Self {
            limit: clamp_limit(raw),
            include_total: false,
        }
    }

    pub fn with_total(mut self, include_total: bool) -> Self {
        self.include_total = include_total;
        self
    }
}

fn clamp_limit(raw: Option<&str>) -> u32 {
    let parsed = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| !n.is_nan() && *n != 0.0);

    match parsed {
        None => DEFAULT_LIST_LIMIT,
        Some(n) if n < 1.0 => 1,
        Some(n) if n >= f64::from(MAX_LIST_LIMIT) => MAX_LIST_LIMIT,
        Some(n) => n.trunc() as u32,
    }
}

/// Result of a list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    /// The items in this page, most recent first.
    pub items: Vec<T>,
    /// Total count of stored rows, when requested.
    pub total: Option<usize>,
    /// Limit that was applied.
    pub limit: u32,
}

impl<T> ListResult<T> {
    /// An empty page, used when there is nothing to read yet.
    pub fn empty(limit: u32, include_total: bool) -> Self {
        Self {
            items: vec![],
            total: include_total.then_some(0),
            limit,
        }
    }
}
