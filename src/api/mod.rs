//! HTTP layer for the lead capture service.

mod client;
mod cors;
mod error;
mod handlers;
pub mod routes;
mod state;
pub mod v1;


use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;

pub use client::{ClientMeta, ip_last4, sha256_hex};
pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

/// Product tag stored when a submission names none.
pub const DEFAULT_PRODUCT: &str = "LEADGRESS";

/// Funnel-stage tag stored when a submission names none.
pub const DEFAULT_VIEW: &str = "waitlist";

/// Values substituted for absent `product` / `view` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDefaults {
    pub product: String,
    pub view: String,
}

impl Default for LeadDefaults {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            view: DEFAULT_VIEW.to_string(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// SQLite database file; `None` runs without a storage binding
    pub db_path: Option<PathBuf>,
    /// Origins allowed to call the API from a browser (exact match)
    pub allowed_origins: Vec<String>,
    /// Defaults for absent submission fields
    pub defaults: LeadDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            db_path: None,
            allowed_origins: vec![],
            defaults: LeadDefaults::default(),
        }
    }
}

impl Config {
    /// Create config from environment variables, falling back to defaults.
    ///
    /// Reads `LEADGRESS_DB`, `LEADGRESS_ALLOWED_ORIGINS` (comma-separated),
    /// `LEADGRESS_DEFAULT_PRODUCT` and `LEADGRESS_DEFAULT_VIEW`.
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Some(path) = non_empty_env("LEADGRESS_DB") {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(origins) = non_empty_env("LEADGRESS_ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&origins);
        }
        if let Some(product) = non_empty_env("LEADGRESS_DEFAULT_PRODUCT") {
            config.defaults.product = product;
        }
        if let Some(view) = non_empty_env("LEADGRESS_DEFAULT_VIEW") {
            config.defaults.view = view;
        }

        config
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the database path (overrides env var)
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.db_path = Some(path);
        self
    }

    /// Replace the allowed origins (overrides env var)
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn with_defaults(mut self, defaults: LeadDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadgress=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the API server with the given configuration and storage binding.
pub async fn run<D: Database + 'static>(config: Config, db: Option<D>) -> Result<(), ApiError> {
    if db.is_none() {
        warn!("No storage binding configured, lead requests will fail until a database is set");
    }
    if config.allowed_origins.is_empty() {
        warn!("No allowed origins configured, browsers on other origins will be refused");
    }

    let state = AppState::new(db, config.defaults.clone());
    let app = routes::create_router(state, &config.allowed_origins)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind { addr, source })?;
    info!("API server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(ApiError::Serve)?;
    Ok(())
}
