//! Snapshot job error types.
//!
//! [`UnitError`] is caught at the unit boundary and turned into a report line.
//! [`SnapshotError`] aborts the whole job.

use miette::Diagnostic;
use thiserror::Error;

use super::codec::CodecError;
use super::fs::FsError;
use crate::store::StoreError;

/// A failure confined to one collection or file.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Filesystem(#[from] FsError),
}

/// A failure that aborts an entire export or import job.
#[derive(Error, Diagnostic, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Connectivity(StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Filesystem(FsError),

    #[error("Job cancelled after {completed} of {total} units")]
    #[diagnostic(code(docsnap::snapshot::cancelled))]
    Cancelled { completed: usize, total: usize },
}
