mod auth;
mod handlers;
pub mod routes;
mod state;


use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::snapshot::{ArtifactFs, JobOptions};
use crate::store::Connector;

pub use handlers::{SnapshotRequest, SnapshotResponse};
pub use state::AppState;

/// Default snapshot directory, relative to the working directory.
pub const DEFAULT_EXPORTS_DIR: &str = "mongo-exports";

/// API server errors
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(docsnap::api::bind),
        help("Is another process already listening on this port? Try --port.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CORS origin '{origin}'")]
    #[diagnostic(
        code(docsnap::api::cors_origin),
        help("FRONTEND_URL must be a single origin such as http://localhost:5173.")
    )]
    CorsOrigin { origin: String },

    #[error("Server error: {0}")]
    #[diagnostic(code(docsnap::api::serve))]
    Serve(#[source] std::io::Error),
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Snapshot root for export and import
    pub exports_dir: PathBuf,
    /// Concurrency and import layout for every job
    pub options: JobOptions,
    /// Bearer token required on snapshot endpoints (None disables the check)
    pub api_token: Option<String>,
    /// Origin allowed to call the API from a browser (None allows any)
    pub frontend_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            exports_dir: PathBuf::from(DEFAULT_EXPORTS_DIR),
            options: JobOptions::default(),
            api_token: None,
            frontend_url: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `DOCSNAP_HOST`, `PORT`, `DOCSNAP_EXPORTS_DIR`,
    /// `DOCSNAP_CONCURRENCY`, `DOCSNAP_API_TOKEN` and `FRONTEND_URL` when set.
    ///
    /// Unparseable numeric values are ignored.
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Some(host) = env::var("DOCSNAP_HOST").ok().and_then(|h| h.parse().ok()) {
            config.host = host;
        }
        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Ok(dir) = env::var("DOCSNAP_EXPORTS_DIR") {
            config.exports_dir = PathBuf::from(dir);
        }
        if let Some(n) = env::var("DOCSNAP_CONCURRENCY")
            .ok()
            .and_then(|n| n.parse().ok())
        {
            config.options = config.options.with_concurrency(n);
        }
        if let Ok(token) = env::var("DOCSNAP_API_TOKEN") {
            config.api_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Ok(origin) = env::var("FRONTEND_URL") {
            config.frontend_url = Some(origin).filter(|o| !o.is_empty());
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

    pub fn with_exports_dir(mut self, exports_dir: PathBuf) -> Self {
        self.exports_dir = exports_dir;
        self
    }

    pub fn with_options(mut self, options: JobOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_api_token(mut self, token: String) -> Self {
        self.api_token = Some(token);
        self
    }

    pub fn with_frontend_url(mut self, origin: String) -> Self {
        self.frontend_url = Some(origin);
        self
    }
}

/// CORS policy for browser clients: `origin` only, or any origin when unset.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, ApiError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        None => Ok(layer.allow_origin(Any)),
        Some(origin) => {
            let value = HeaderValue::from_str(origin).map_err(|_| ApiError::CorsOrigin {
                origin: origin.to_string(),
            })?;
            Ok(layer.allow_origin(value))
        }
    }
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsnap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Run the API server with the given configuration and backends.
pub async fn run<C, F>(config: Config, connector: C, fs: F) -> Result<(), ApiError>
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    init_tracing();

    if config.api_token.is_none() {
        warn!("No API token configured; snapshot endpoints are open");
    }

    let state = AppState::new(connector, fs, config.exports_dir.clone(), config.options)
        .with_api_token(config.api_token.clone());
    let cors = cors_layer(config.frontend_url.as_deref())?;
    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(
        exports_dir = %config.exports_dir.display(),
        concurrency = config.options.concurrency(),
        cors_origin = config.frontend_url.as_deref().unwrap_or("*"),
        "API server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ApiError::Serve)?;
    Ok(())
}
