//! Lead capture handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::{ApiError, AppState, ClientMeta, ErrorResponse, LeadDefaults};
use crate::db::utils::{current_timestamp, generate_lead_id};
use crate::db::{Database, DbError, Lead, LeadQuery, LeadRepository, LeadSummary, ListResult};

// =============================================================================
// DTOs
// =============================================================================

/// Lead submission. Every field is optional; empty strings count as absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitLeadRequest {
    #[schema(example = "Sara")]
    pub name: Option<String>,
    #[schema(example = "sara@example.com")]
    pub email: Option<String>,
    #[schema(example = "0500000000")]
    pub phone: Option<String>,
    #[schema(example = "LEADGRESS")]
    pub product: Option<String>,
    #[schema(example = "waitlist")]
    pub view: Option<String>,
    #[schema(example = "instagram")]
    pub utm_source: Option<String>,
    #[schema(example = "launch")]
    pub utm_campaign: Option<String>,
    pub notes: Option<String>,
}

impl SubmitLeadRequest {
    /// Normalize the submission into a storable lead.
    pub fn into_lead(self, defaults: &LeadDefaults, client: &ClientMeta) -> Lead {
        Lead {
            id: generate_lead_id(),
            name: present(self.name).unwrap_or_default(),
            email: present(self.email),
            phone: present(self.phone),
            product: present(self.product).unwrap_or_else(|| defaults.product.clone()),
            view: present(self.view).unwrap_or_else(|| defaults.view.clone()),
            created_at: current_timestamp(),
            ip_last4: client.ip_last4(),
            ua_hash: client.ua_hash(),
            utm_source: present(self.utm_source),
            utm_campaign: present(self.utm_campaign),
            notes: present(self.notes),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadCreatedResponse {
    #[schema(example = true)]
    pub ok: bool,
    /// Generated lead ID
    #[schema(example = "9b2f5c1e-8d7a-4f3b-a2c4-6e1d0f9a7b35")]
    pub id: String,
}

/// Public-safe lead fields
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadResponse {
    pub id: String,
    #[schema(example = "Sara")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub product: Option<String>,
    pub view: Option<String>,
    #[schema(example = "2025-01-01T00:00:00.000Z")]
    pub created_at: Option<String>,
}

impl From<LeadSummary> for LeadResponse {
    fn from(l: LeadSummary) -> Self {
        Self {
            id: l.id,
            name: l.name,
            email: l.email,
            phone: l.phone,
            product: l.product,
            view: l.view,
            created_at: l.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadListResponse {
    #[schema(example = true)]
    pub ok: bool,
    /// Most recent first
    pub items: Vec<LeadResponse>,
    /// Total stored leads, only with `debug=1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListLeadsQuery {
    /// Maximum number of items (1-200, default 50)
    #[param(example = "50")]
    pub limit: Option<String>,
    /// `1` to include the total row count
    #[param(example = "1")]
    pub debug: Option<String>,
}

impl ListLeadsQuery {
    fn debug_enabled(&self) -> bool {
        matches!(self.debug.as_deref(), Some("1") | Some("true"))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Submit a lead
///
/// Stores one lead and returns its generated ID
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = SubmitLeadRequest,
    responses(
        (status = 201, description = "Lead stored", body = LeadCreatedResponse),
        (status = 500, description = "Storage missing, invalid body or storage failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state, client, body))]
pub async fn submit_lead<D: Database>(
    State(state): State<AppState<D>>,
    client: ClientMeta,
    body: Bytes,
) -> Result<(StatusCode, Json<LeadCreatedResponse>), ApiError> {
    let db = state.db()?;
    let req: SubmitLeadRequest = serde_json::from_slice(&body)?;

    let lead = req.into_lead(state.defaults(), &client);
    db.leads().insert(&lead).await?;

    info!(id = %lead.id, product = %lead.product, view = %lead.view, "Lead captured");

    Ok((
        StatusCode::CREATED,
        Json(LeadCreatedResponse {
            ok: true,
            id: lead.id,
        }),
    ))
}

/// List recent leads
///
/// Returns the most recent leads, public-safe fields only
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Most recent leads", body = LeadListResponse),
        (status = 500, description = "Storage missing or storage failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_leads<D: Database>(
    State(state): State<AppState<D>>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let db = state.db()?;
    let db_query = LeadQuery::from_raw_limit(query.limit.as_deref()).with_total(query.debug_enabled());

    let result = match db.leads().list(&db_query).await {
        Ok(result) => result,
        Err(DbError::TableMissing { table }) => {
            debug!(table = %table, "No leads table yet, returning an empty page");
            ListResult::empty(db_query.limit, db_query.include_total)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(LeadListResponse {
        ok: true,
        items: result.items.into_iter().map(LeadResponse::from).collect(),
        total: result.total,
    }))
}
