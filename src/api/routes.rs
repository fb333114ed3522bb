//! API route configuration.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::auth;
use super::handlers::{self, HealthResponse, SnapshotRequest, SnapshotResponse};
use super::state::AppState;
use crate::snapshot::ArtifactFs;
use crate::store::Connector;

/// Build routes with generic connector and filesystem types.
///
/// Applies the turbofish to every handler so each route line stays short.
macro_rules! routes {
    ($C:ty, $F:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$C, $F>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docsnap API",
        version = "0.1.0",
        description = "Bulk export and import of document store collections as strict Extended JSON",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::health,
        handlers::export_snapshot,
        handlers::import_snapshot,
    ),
    components(
        schemas(
            HealthResponse,
            SnapshotRequest,
            SnapshotResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "snapshot", description = "Snapshot export and import endpoints")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router<C, F>(state: AppState<C, F>) -> Router
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    let api = ApiDoc::openapi();

    let system_routes = Router::new().route("/health", get(handlers::health));

    // Snapshot routes (generic over Connector and ArtifactFs), token-gated
    let snapshot_routes = routes!(C, F => {
        post "/api/export" => handlers::export_snapshot,
        post "/api/import" => handlers::import_snapshot,
    })
    .route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_token::<C, F>,
    ));

    system_routes
        .merge(snapshot_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
