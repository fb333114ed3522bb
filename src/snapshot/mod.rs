//! Snapshot module - bulk export and import of document store collections.
//!
//! Every user collection is written to `<root>/<database>/<collection>.json`
//! as a strict Extended JSON array, and such a tree can be read back into a
//! (possibly different) store. Failures are isolated per collection: only a
//! connection failure aborts a job.

mod catalog;
pub mod codec;
mod error;
mod export;
mod fs;
mod import;
#[cfg(test)]
mod import_test;
mod job;
mod report;


pub use catalog::{
    ExportUnit, ImportEntry, ImportLayout, ImportUnit, RESERVED_DATABASES, is_reserved_database,
    list_export_units, list_import_units, resolve_entry,
};
pub use codec::CodecError;
pub use error::{SnapshotError, UnitError};
pub use export::{export_all, export_job};
#[cfg(test)]
pub use fs::MockArtifactFs;
pub use fs::{ArtifactFs, FsError, LocalFs, check_component};
pub use import::{import_all, import_job};
pub use job::JobOptions;
pub use report::{Outcome, OutcomeRecord, Report};
