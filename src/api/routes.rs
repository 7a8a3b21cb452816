//! API route configuration.

use axum::Router;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::cors::cors_layer;
use super::handlers::{self, HealthResponse};
use super::state::AppState;
use super::v1::{
    self, LeadCreatedResponse, LeadListResponse, LeadResponse, SubmitLeadRequest,
};
use super::ErrorResponse;
use crate::db::Database;

/// Build routes with generic database type.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the Database trait. It applies the turbofish operator automatically.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadgress API",
        version = "0.1.0",
        description = "Lead capture service for the fitness-trainer landing page",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::root,
        handlers::health,
        v1::submit_lead,
        v1::list_leads,
    ),
    components(
        schemas(
            HealthResponse,
            SubmitLeadRequest,
            LeadCreatedResponse,
            LeadResponse,
            LeadListResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "leads", description = "Lead capture endpoints. `OPTIONS /api/leads` preflights are answered by the CORS layer with 200, the allow-list headers and no body.")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation and the CORS policy.
pub fn create_router<D: Database + 'static>(
    state: AppState<D>,
    allowed_origins: &[String],
) -> Router {
    let api = ApiDoc::openapi();

    // System routes (non-generic)
    let system_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health));

    // Lead routes (generic over Database)
    let lead_routes = routes!(D => {
        get "/api/leads" => v1::list_leads,
        post "/api/leads" => v1::submit_lead,
    });

    system_routes
        .merge(lead_routes)
        .merge(Scalar::with_url("/docs", api))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
