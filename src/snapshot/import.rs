//! Import a directory tree of artifact files into a store.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::store::{Connector, DocumentStore};

use super::catalog::{ImportEntry, ImportUnit, list_import_units};
use super::codec::{decode, into_documents};
use super::error::{SnapshotError, UnitError};
use super::fs::{ArtifactFs, FsError};
use super::job::{JobOptions, run_units};
use super::report::{OutcomeRecord, Report};

/// Open a connection to `uri`, import everything under `input_root`, and
/// release the connection on every exit path.
///
/// Fails only when the connection cannot be used, the input root cannot be
/// walked, or when cancelled. There is no atomicity across files: units
/// imported before a failure or cancellation stay imported.
pub async fn import_job<C, F>(
    connector: &C,
    fs: &F,
    uri: &str,
    input_root: &Path,
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

    let result = import_all(&store, fs, input_root, options, cancel).await;
    store.close().await;
    result
}

/// Import every artifact under `input_root` into an open store.
#[instrument(skip_all, fields(root = %input_root.display()))]
pub async fn import_all<S, F>(
    store: &S,
    fs: &F,
    input_root: &Path,
    options: &JobOptions,
    cancel: &CancellationToken,
) -> Result<Report, SnapshotError>
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    store.ping().await.map_err(SnapshotError::Connectivity)?;

    let entries =
        list_import_units(fs, input_root, options.layout()).map_err(SnapshotError::Filesystem)?;
    info!(files = entries.len(), "Importing artifacts");

    let report = run_units(entries, options.concurrency(), cancel, |entry| {
        import_entry(store, fs, entry)
    })
    .await?;

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Import finished"
    );
    Ok(report)
}

async fn import_entry<S, F>(store: &S, fs: &F, entry: ImportEntry) -> OutcomeRecord
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    let unit = match entry {
        ImportEntry::Unit(unit) => unit,
        ImportEntry::Misplaced {
            path,
            file_name,
            database,
        } => {
            warn!(path = %path.display(), "Skipping misplaced artifact");
            return OutcomeRecord::failed(file_name, database, FsError::Misplaced { path });
        }
    };

    let file_name = unit.file_name();
    match load_artifact(store, fs, &unit).await {
        Ok(count) => {
            debug!(database = %unit.database, collection = %unit.collection, count, "Imported collection");
            OutcomeRecord::imported(file_name, unit.database, count)
        }
        Err(error) => {
            warn!(path = %unit.path.display(), %error, "Artifact import failed");
            OutcomeRecord::failed(file_name, unit.database, error)
        }
    }
}

async fn load_artifact<S, F>(store: &S, fs: &F, unit: &ImportUnit) -> Result<u64, UnitError>
where
    S: DocumentStore,
    F: ArtifactFs + ?Sized,
{
    let text = fs.read_to_string(&unit.path)?;
    let documents = into_documents(decode(&text)?)?;

    // Empty artifacts never reach the store
    if documents.is_empty() {
        return Ok(0);
    }

    Ok(store
        .insert_many(&unit.database, &unit.collection, documents)
        .await?)
}
