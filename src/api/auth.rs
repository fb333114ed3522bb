//! Static bearer-token gate for the snapshot endpoints.
//!
//! There is no login or token issuance: the server is started with a token
//! (or none) and every snapshot request must present it.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::handlers::SnapshotResponse;
use super::state::AppState;
use crate::snapshot::ArtifactFs;
use crate::store::Connector;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Reject requests without the configured bearer token. A no-op when the
/// server has no token configured.
pub async fn require_token<C, F>(
    State(state): State<AppState<C, F>>,
    request: Request,
    next: Next,
) -> Response
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    let Some(expected) = state.api_token() else {
        return next.run(request).await;
    };

    if bearer_token(&request) == Some(expected) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected request without valid token");
    (
        StatusCode::UNAUTHORIZED,
        Json(SnapshotResponse::failure("Unauthorized")),
    )
        .into_response()
}
