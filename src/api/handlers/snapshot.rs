//! Snapshot export/import handlers.
//!
//! Both endpoints take `{ "uri": "..." }`, run one job against that store and
//! answer `{ "success": bool, "message": string }`. A job that ran answers 200
//! even when some collections failed; the report lines say which.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::snapshot::{ArtifactFs, Report, SnapshotError, export_job, import_job};
use crate::store::Connector;

/// Export/import request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SnapshotRequest {
    /// Connection URI of the document store
    #[schema(example = "mongodb://localhost:27017")]
    pub uri: Option<String>,
}

/// Export/import response
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SnapshotResponse {
    /// Whether the job ran
    pub success: bool,
    /// Report (one line per collection) or error description
    #[schema(example = "orders.json (shop) ✅ 12 documents exported")]
    pub message: String,
}

impl SnapshotResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub type SnapshotReply = (StatusCode, Json<SnapshotResponse>);

#[derive(Debug, Clone, Copy)]
enum JobKind {
    Export,
    Import,
}

fn required_uri(payload: Result<Json<SnapshotRequest>, JsonRejection>) -> Result<String, SnapshotReply> {
    match payload {
        Ok(Json(SnapshotRequest { uri: Some(uri) })) if !uri.trim().is_empty() => Ok(uri),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(SnapshotResponse::failure("MongoDB URI is required")),
        )),
    }
}

/// Run a job on its own task.
///
/// If the request is dropped before the job ends, the drop guard cancels the
/// job, which then stops between units and still releases its connection.
async fn run_job<C, F>(
    state: AppState<C, F>,
    uri: String,
    kind: JobKind,
) -> Result<Report, String>
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let handle = tokio::spawn(async move {
        let (fs, root, options) = (state.fs(), state.exports_dir(), state.options());
        match kind {
            JobKind::Export => {
                export_job(state.connector(), fs, &uri, root, options, &cancel).await
            }
            JobKind::Import => {
                import_job(state.connector(), fs, &uri, root, options, &cancel).await
            }
        }
    });

    let joined = handle.await;
    guard.disarm();

    match joined {
        Ok(result) => result.map_err(|e: SnapshotError| e.to_string()),
        Err(e) => Err(format!("job task failed: {}", e)),
    }
}

fn reply(kind: JobKind, result: Result<Report, String>) -> SnapshotReply {
    match result {
        Ok(report) => {
            info!(
                ?kind,
                succeeded = report.succeeded(),
                failed = report.failed(),
                "Snapshot job completed"
            );
            (
                StatusCode::OK,
                Json(SnapshotResponse {
                    success: true,
                    message: report.text(),
                }),
            )
        }
        Err(message) => {
            error!(?kind, %message, "Snapshot job failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SnapshotResponse::failure(format!("Error: {}", message))),
            )
        }
    }
}

/// Export every user collection to the snapshot directory
#[utoipa::path(
    post,
    path = "/api/export",
    tag = "snapshot",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Export ran; see report lines for per-collection results", body = SnapshotResponse),
        (status = 400, description = "Missing connection URI", body = SnapshotResponse),
        (status = 401, description = "Missing or invalid bearer token", body = SnapshotResponse),
        (status = 500, description = "Connection failed or job aborted", body = SnapshotResponse)
    )
)]
#[instrument(skip_all)]
pub async fn export_snapshot<C, F>(
    State(state): State<AppState<C, F>>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> SnapshotReply
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    let uri = match required_uri(payload) {
        Ok(uri) => uri,
        Err(rejected) => return rejected,
    };

    reply(JobKind::Export, run_job(state, uri, JobKind::Export).await)
}

/// Import the snapshot directory into a store
#[utoipa::path(
    post,
    path = "/api/import",
    tag = "snapshot",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Import ran; see report lines for per-file results", body = SnapshotResponse),
        (status = 400, description = "Missing connection URI", body = SnapshotResponse),
        (status = 401, description = "Missing or invalid bearer token", body = SnapshotResponse),
        (status = 500, description = "Connection failed, snapshot directory unreadable, or job aborted", body = SnapshotResponse)
    )
)]
#[instrument(skip_all)]
pub async fn import_snapshot<C, F>(
    State(state): State<AppState<C, F>>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> SnapshotReply
where
    C: Connector + 'static,
    F: ArtifactFs + 'static,
{
    let uri = match required_uri(payload) {
        Ok(uri) => uri,
        Err(rejected) => return rejected,
    };

    reply(JobKind::Import, run_job(state, uri, JobKind::Import).await)
}
