//! Enumerates units of work for export and import.
//!
//! The export side asks a live store for its databases and collections. The
//! import side maps a directory tree laid out as
//! `<root>/<database>/<collection>.json` back onto collections.

use std::path::{Component, Path, PathBuf};

use crate::store::{DocumentStore, StoreResult};

use super::fs::{ArtifactFs, FsError};

/// Databases that are never exported.
pub const RESERVED_DATABASES: [&str; 3] = ["admin", "local", "config"];

/// Artifact file extension, including the dot.
pub const ARTIFACT_EXTENSION: &str = ".json";

/// One collection to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnit {
    pub database: String,
    pub collection: String,
}

impl ExportUnit {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }

    /// Artifact file name, e.g. `orders.json`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.collection, ARTIFACT_EXTENSION)
    }

    /// Directory holding this unit's artifact under `root`.
    pub fn directory(&self, root: &Path) -> PathBuf {
        root.join(&self.database)
    }

    /// Artifact path under `root`.
    pub fn artifact_path(&self, root: &Path) -> PathBuf {
        self.directory(root).join(self.file_name())
    }
}

/// One artifact file to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportUnit {
    pub database: String,
    pub collection: String,
    pub path: PathBuf,
}

impl ImportUnit {
    pub fn file_name(&self) -> String {
        format!("{}{}", self.collection, ARTIFACT_EXTENSION)
    }
}

/// A walked artifact file, either mapped onto a collection or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEntry {
    Unit(ImportUnit),
    /// A `.json` file whose location does not name a database.
    Misplaced {
        path: PathBuf,
        file_name: String,
        /// Best-effort label for the report; empty when there is none.
        database: String,
    },
}

/// How strictly artifact locations are checked on import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportLayout {
    /// The first segment below the root names the database, whatever the depth.
    #[default]
    Lenient,
    /// Only files exactly at `<root>/<database>/<collection>.json` are units.
    Strict,
}

impl std::str::FromStr for ImportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown layout '{}' (expected 'lenient' or 'strict')",
                other
            )),
        }
    }
}

/// Whether `name` is one of the reserved databases. Exact, case-sensitive.
pub fn is_reserved_database(name: &str) -> bool {
    RESERVED_DATABASES.contains(&name)
}

/// List every collection of every non-reserved database, in store order.
///
/// Reads no document bodies. Any failure here is a connectivity failure.
pub async fn list_export_units<S: DocumentStore>(store: &S) -> StoreResult<Vec<ExportUnit>> {
    let mut units = Vec::new();

    for database in store.list_database_names().await? {
        if is_reserved_database(&database) {
            continue;
        }

        for collection in store.list_collection_names(&database).await? {
            units.push(ExportUnit::new(database.clone(), collection));
        }
    }

    Ok(units)
}

/// Walk `root` and map every `.json` file onto an import entry.
pub fn list_import_units<F: ArtifactFs + ?Sized>(
    fs: &F,
    root: &Path,
    layout: ImportLayout,
) -> Result<Vec<ImportEntry>, FsError> {
    let files = fs.walk_json_files(root)?;
    Ok(files
        .into_iter()
        .map(|path| resolve_entry(root, path, layout))
        .collect())
}

/// Map one walked file onto an import entry.
///
/// The collection is always the file name without `.json`, whatever the depth.
pub fn resolve_entry(root: &Path, path: PathBuf, layout: ImportLayout) -> ImportEntry {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let segments: Vec<String> = path
        .strip_prefix(root)
        .unwrap_or(&path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let collection = file_name
        .strip_suffix(ARTIFACT_EXTENSION)
        .unwrap_or(&file_name)
        .to_string();

    let well_placed = match layout {
        ImportLayout::Lenient => segments.len() >= 2,
        ImportLayout::Strict => segments.len() == 2,
    };

    if !well_placed || collection.is_empty() {
        let database = if segments.len() >= 2 {
            segments[0].clone()
        } else {
            String::new()
        };
        return ImportEntry::Misplaced {
            path,
            file_name,
            database,
        };
    }

    ImportEntry::Unit(ImportUnit {
        database: segments[0].clone(),
        collection,
        path,
    })
}
