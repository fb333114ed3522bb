//! Export and import command implementations.

use reqwest::StatusCode;

use crate::api::{SnapshotRequest, SnapshotResponse};
use crate::cli::api_client::ApiClient;
use crate::cli::error::{CliError, CliResult};

/// Ask the server to export every user collection of `uri`
pub async fn export(api_client: &ApiClient, uri: &str) -> CliResult<String> {
    submit(api_client, "/api/export", uri).await
}

/// Ask the server to import its snapshot directory into `uri`
pub async fn import(api_client: &ApiClient, uri: &str) -> CliResult<String> {
    submit(api_client, "/api/import", uri).await
}

async fn submit(api_client: &ApiClient, path: &str, uri: &str) -> CliResult<String> {
    let req = SnapshotRequest {
        uri: Some(uri.to_string()),
    };

    let response = api_client
        .post(path)
        .json(&req)
        .send()
        .await
        .map_err(|e| CliError::ConnectionFailed { source: e })?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(CliError::Unauthorized);
    }

    let body = response.text().await?;
    let parsed: Result<SnapshotResponse, _> = serde_json::from_str(&body);

    match parsed {
        Ok(reply) if status.is_success() && reply.success => Ok(reply.message),
        Ok(reply) => Err(CliError::ApiError {
            status: status.as_u16(),
            message: reply.message,
        }),
        Err(_) if !status.is_success() => Err(CliError::ApiError {
            status: status.as_u16(),
            message: body,
        }),
        Err(e) => Err(CliError::InvalidResponse {
            message: e.to_string(),
        }),
    }
}
