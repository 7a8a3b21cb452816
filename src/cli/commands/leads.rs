use std::path::Path;

use tabled::{Table, Tabled};

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, open_database, or_dash, truncate_with_ellipsis};
use crate::db::{Database, LeadQuery, LeadRepository, LeadSummary};

#[derive(Tabled)]
pub(crate) struct LeadDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Email")]
    pub(crate) email: String,
    #[tabled(rename = "Phone")]
    pub(crate) phone: String,
    #[tabled(rename = "Product")]
    pub(crate) product: String,
    #[tabled(rename = "View")]
    pub(crate) view: String,
    #[tabled(rename = "Created")]
    pub(crate) created_at: String,
}

impl From<&LeadSummary> for LeadDisplay {
    fn from(lead: &LeadSummary) -> Self {
        Self {
            id: lead.id.chars().take(8).collect(),
            name: or_dash(Some(truncate_with_ellipsis(&lead.name, 30).as_str())),
            email: or_dash(lead.email.as_deref()),
            phone: or_dash(lead.phone.as_deref()),
            product: or_dash(lead.product.as_deref()),
            view: or_dash(lead.view.as_deref()),
            created_at: or_dash(lead.created_at.as_deref()),
        }
    }
}

pub(crate) fn format_table(leads: &[LeadSummary]) -> String {
    if leads.is_empty() {
        return "No leads found.".to_string();
    }

    let display: Vec<LeadDisplay> = leads.iter().map(LeadDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

pub(crate) fn format_leads(leads: &[LeadSummary], format: &str) -> CliResult<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(leads)?),
        "table" => Ok(format_table(leads)),
        other => Err(CliError::UnknownFormat {
            format: other.to_string(),
        }),
    }
}

/// List the most recent leads from the database.
pub async fn list_leads(path: &Path, limit: Option<&str>, format: &str) -> CliResult<String> {
    // Reject bad formats before touching the database
    format_leads(&[], format)?;

    let db = open_database(path).await?;
    let result = db.leads().list(&LeadQuery::from_raw_limit(limit)).await?;
    format_leads(&result.items, format)
}
