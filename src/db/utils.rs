//! Database utility functions.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generate a fresh unique ID for a lead.
pub fn generate_lead_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
///
/// The fixed width keeps lexical order equal to chronological order.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
