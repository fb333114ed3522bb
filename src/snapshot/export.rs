//! Export every user collection of a store to artifact files.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::store::{Connector, DocumentStore};

use super::catalog::{ExportUnit, list_export_units};
use super::codec::encode;
use super::error::{SnapshotError, UnitError};
use super::fs::{ArtifactFs, check_component};
use super::job::{JobOptions, run_units};
use super::report::{OutcomeRecord, Report};

/// Open a connection to `uri`, export into `output_root`, and release the
/// connection on every exit path.
///
/// Fails only when the connection cannot be used or the catalog cannot be
/// listed, or when cancelled; every other failure is a line in the report.
pub async fn export_job<C, F>(
    connector: &C,
    fs: &F,
    uri: &str,
    output_root: &Path,
    options: &JobOptions,
    cancel: &CancellationToken,
) -> Result<Report, SnapshotError>
where
    C: Connector,
    F: ArtifactFs + ?Sized,
{
    let store = connector
        .open(uri)
        .await
        .map_err(SnapshotError::Connectivity)?;

    let result = export_all(&store, fs, output_root, options, cancel).await;
    store.close().await;
    result
}

/// Export every collection of every non-reserved database on an open store.
///
/// Writes `<output_root>/<database>/<collection>.json` per collection.
#[instrument(skip_all, fields(root = %output_root.display()))]
pub async fn export_all<S, F>(
    store: &S,
    fs: &F,
    output_root: &Path,
    options: &JobOptions,
    cancel: &CancellationToken,
) -> Result<Report, SnapshotError>
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    store.ping().await.map_err(SnapshotError::Connectivity)?;

    let units = list_export_units(store)
        .await
        .map_err(SnapshotError::Connectivity)?;
    info!(units = units.len(), "Exporting collections");

    let report = run_units(units, options.concurrency(), cancel, |unit| {
        export_unit(store, fs, output_root, unit)
    })
    .await?;

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Export finished"
    );
    Ok(report)
}

async fn export_unit<S, F>(store: &S, fs: &F, root: &Path, unit: ExportUnit) -> OutcomeRecord
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    let file_name = unit.file_name();
    match write_artifact(store, fs, root, &unit).await {
        Ok(count) => {
            debug!(database = %unit.database, collection = %unit.collection, count, "Exported collection");
            OutcomeRecord::exported(file_name, unit.database, count)
        }
        Err(error) => {
            warn!(database = %unit.database, collection = %unit.collection, %error, "Collection export failed");
            OutcomeRecord::failed(file_name, unit.database, error)
        }
    }
}

async fn write_artifact<S, F>(
    store: &S,
    fs: &F,
    root: &Path,
    unit: &ExportUnit,
) -> Result<u64, UnitError>
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    check_component(&unit.database)?;
    check_component(&unit.file_name())?;

    let documents = store.find_all(&unit.database, &unit.collection).await?;
    let text = encode(&documents)?;

    fs.create_dir_all(&unit.directory(root))?;
    fs.write(&unit.artifact_path(root), &text)?;

    Ok(documents.len() as u64)
}
