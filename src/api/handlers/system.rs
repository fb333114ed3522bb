//! Liveness endpoint for the snapshot server.

use axum::Json;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

/// Liveness of the docsnap server
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Crate version of the running server
    #[schema(example = "0.1.0")]
    pub version: &'static str,
}

/// Report that the server is up.
///
/// Opens no document store connection, so it says nothing about whether a
/// given MongoDB URI is reachable; export and import check that per job.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Server is accepting requests", body = HealthResponse)
    )
)]
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
