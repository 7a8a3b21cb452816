//! Known schema versions for the `leads` table.
//!
//! Deployments may carry a table created by an older release. Instead of
//! introspecting on every request, the table's columns are matched once
//! against the versions below and the result is cached by the storage
//! backend for the lifetime of the process.

use std::fmt;

use serde::Serialize;

/// Name of the backing table.
pub const LEADS_TABLE: &str = "leads";

/// A column of the `leads` table this release knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadColumn {
    Id,
    Name,
    Email,
    Phone,
    Product,
    View,
    CreatedAt,
    IpLast4,
    UaHash,
    UtmSource,
    UtmCampaign,
    Notes,
}

impl LeadColumn {
    /// Column name as it appears in SQL.
    pub const fn name(self) -> &'static str {
        match self {
            LeadColumn::Id => "id",
            LeadColumn::Name => "name",
            LeadColumn::Email => "email",
            LeadColumn::Phone => "phone",
            LeadColumn::Product => "product",
            LeadColumn::View => "view",
            LeadColumn::CreatedAt => "created_at",
            LeadColumn::IpLast4 => "ip_last4",
            LeadColumn::UaHash => "ua_hash",
            LeadColumn::UtmSource => "utm_source",
            LeadColumn::UtmCampaign => "utm_campaign",
            LeadColumn::Notes => "notes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        LEAD_COLUMNS.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for LeadColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns written by the current release, in insert order.
pub const LEAD_COLUMNS: &[LeadColumn] = &[
    LeadColumn::Id,
    LeadColumn::Name,
    LeadColumn::Email,
    LeadColumn::Phone,
    LeadColumn::Product,
    LeadColumn::View,
    LeadColumn::CreatedAt,
    LeadColumn::IpLast4,
    LeadColumn::UaHash,
    LeadColumn::UtmSource,
    LeadColumn::UtmCampaign,
    LeadColumn::Notes,
];

/// Columns returned by list queries.
pub const PUBLIC_COLUMNS: &[LeadColumn] = &[
    LeadColumn::Id,
    LeadColumn::Name,
    LeadColumn::Email,
    LeadColumn::Phone,
    LeadColumn::Product,
    LeadColumn::View,
    LeadColumn::CreatedAt,
];

/// Columns that are always part of an insert, whatever the table looks like.
pub const REQUIRED_COLUMNS: &[LeadColumn] = &[LeadColumn::Id, LeadColumn::CreatedAt];

/// A named, released shape of the `leads` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub name: &'static str,
    pub columns: &'static [LeadColumn],
}

/// Known versions, oldest first. The last entry is the one we create.
pub const KNOWN_VERSIONS: &[SchemaVersion] = &[
    SchemaVersion {
        name: "v1",
        columns: PUBLIC_COLUMNS,
    },
    SchemaVersion {
        name: "v2",
        columns: LEAD_COLUMNS,
    },
];

/// DDL for the current version.
pub const CREATE_LEADS_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    email TEXT,
    phone TEXT,
    product TEXT,
    "view" TEXT,
    created_at TEXT NOT NULL,
    ip_last4 TEXT,
    ua_hash TEXT,
    utm_source TEXT,
    utm_campaign TEXT,
    notes TEXT
)"#;

pub const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads (created_at)";

/// The column layout the running process writes to and reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    /// Known version whose columns match the table exactly, or `None` when
    /// the table has drifted.
    pub version: Option<&'static str>,
    /// Columns used for inserts, in canonical order.
    pub insert_columns: Vec<LeadColumn>,
    /// Public columns actually present in the table.
    pub read_columns: Vec<LeadColumn>,
}

impl ResolvedSchema {
    /// Match the table's actual columns against the known versions.
    ///
    /// Inserts always use the intersection of [`LEAD_COLUMNS`] and the
    /// existing columns, with [`REQUIRED_COLUMNS`] forced in. The version is
    /// a label: it is set only when the known columns present are exactly
    /// those of a released version. Unknown extra columns are ignored.
    pub fn resolve<S: AsRef<str>>(existing: &[S]) -> Self {
        let present: Vec<LeadColumn> = LEAD_COLUMNS
            .iter()
            .copied()
            .filter(|c| existing.iter().any(|e| e.as_ref() == c.name()))
            .collect();

        let version = KNOWN_VERSIONS
            .iter()
            .find(|v| v.columns.len() == present.len() && v.columns.iter().all(|c| present.contains(c)))
            .map(|v| v.name);

        let insert_columns = LEAD_COLUMNS
            .iter()
            .copied()
            .filter(|c| present.contains(c) || REQUIRED_COLUMNS.contains(c))
            .collect();

        let read_columns = PUBLIC_COLUMNS
            .iter()
            .copied()
            .filter(|c| present.contains(c))
            .collect();

        Self {
            version,
            insert_columns,
            read_columns,
        }
    }

    /// The schema of a table created by this release.
    pub fn current() -> Self {
        let names: Vec<&str> = LEAD_COLUMNS.iter().map(|c| c.name()).collect();
        Self::resolve(&names)
    }

    pub fn can_read(&self, column: LeadColumn) -> bool {
        self.read_columns.contains(&column)
    }
}
