//! Filesystem access for snapshot artifacts.
//!
//! This module provides a trait-based abstraction over the few filesystem
//! operations the pipelines need, so disk failures can be simulated in tests.

use ignore::WalkBuilder;
use miette::Diagnostic;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Errors that can occur during filesystem operations.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("Failed to create directory {path}: {message}")]
    #[diagnostic(code(docsnap::fs::create_dir))]
    CreateDir { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    #[diagnostic(code(docsnap::fs::write))]
    Write { path: PathBuf, message: String },

    #[error("Failed to read {path}: {message}")]
    #[diagnostic(code(docsnap::fs::read))]
    Read { path: PathBuf, message: String },

    #[error("Failed to walk {path}: {message}")]
    #[diagnostic(code(docsnap::fs::walk))]
    Walk { path: PathBuf, message: String },

    #[error("Snapshot directory not found: {path}")]
    #[diagnostic(
        code(docsnap::fs::missing_root),
        help("Run an export first, or point the server at an existing snapshot directory.")
    )]
    MissingRoot { path: PathBuf },

    #[error("Unexpected location {path}: expected <database>/<collection>.json")]
    #[diagnostic(code(docsnap::fs::misplaced))]
    Misplaced { path: PathBuf },

    #[error("Invalid name '{name}': not usable as a file name")]
    #[diagnostic(code(docsnap::fs::invalid_name))]
    InvalidName { name: String },
}

/// Check that `name` can be used as a single path component.
///
/// Database and collection names become directory and file names. Anything
/// the host filesystem accepts as one component is allowed (`:`, `?`, `*`
/// and friends included on Unix); a separator, `.`, `..` or NUL is refused
/// so nothing is written outside the snapshot root.
pub fn check_component(name: &str) -> Result<(), FsError> {
    let mut components = Path::new(name).components();
    let single = match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part == name,
        _ => false,
    };

    if single && !name.contains('\0') {
        Ok(())
    } else {
        Err(FsError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Trait for artifact filesystem operations. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait ArtifactFs: Send + Sync {
    /// Create a directory and all missing parents. Succeeds if it exists.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;

    /// Create or truncate `path` and write `contents` to it.
    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;

    /// Recursively list regular files under `root` whose name ends in `.json`.
    fn walk_json_files(&self, root: &Path) -> Result<Vec<PathBuf>, FsError>;
}

/// Real implementation of ArtifactFs on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactFs for LocalFs {
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        std::fs::create_dir_all(path).map_err(|e| FsError::CreateDir {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        std::fs::write(path, contents).map_err(|e| FsError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        std::fs::read_to_string(path).map_err(|e| FsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn walk_json_files(&self, root: &Path) -> Result<Vec<PathBuf>, FsError> {
        if !root.is_dir() {
            return Err(FsError::MissingRoot {
                path: root.to_path_buf(),
            });
        }

        // Plain walk: no ignore files, hidden entries included
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| FsError::Walk {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;

            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            let is_json = entry.file_name().to_string_lossy().ends_with(".json");
            if is_file && is_json {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_walk_finds_nested_json_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("shop")).unwrap();
        std::fs::create_dir_all(root.join("crm/archive")).unwrap();
        std::fs::write(root.join("shop/orders.json"), "[]").unwrap();
        std::fs::write(root.join("shop/notes.txt"), "ignored").unwrap();
        std::fs::write(root.join("crm/archive/old.json"), "[]").unwrap();
        std::fs::create_dir_all(root.join("shop/dir.json")).unwrap();

        let files = LocalFs::new().walk_json_files(root).unwrap();

        assert_eq!(
            files,
            vec![
                root.join("crm/archive/old.json"),
                root.join("shop/orders.json"),
            ]
        );
    }

    #[test]
    fn test_walk_includes_hidden_and_gitignored_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("shop")).unwrap();
        std::fs::write(root.join(".gitignore"), "*.json\n").unwrap();
        std::fs::write(root.join("shop/.hidden.json"), "[]").unwrap();

        let files = LocalFs::new().walk_json_files(root).unwrap();

        assert_eq!(files, vec![root.join("shop/.hidden.json")]);
    }

    #[test]
    fn test_walk_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = LocalFs::new().walk_json_files(&missing);

        assert_eq!(result, Err(FsError::MissingRoot { path: missing }));
    }

    #[test]
    fn test_check_component() {
        assert!(check_component("orders").is_ok());
        assert!(check_component("system.profile.json").is_ok());
        assert!(check_component("a/b").is_err());
        assert!(check_component("..").is_err());
        assert!(check_component(".").is_err());
        assert!(check_component("").is_err());
        assert!(check_component("orders/").is_err());
        assert!(check_component("nul\0byte").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_check_component_allows_unix_legal_names() {
        for name in ["events:2024", "a?b", "star*", "pipe|x", "q\"x", "back\\slash", "lt<gt>"] {
            assert!(check_component(name).is_ok(), "{} should be allowed", name);
        }
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a/b");
        let fs = LocalFs::new();

        fs.create_dir_all(&dir).unwrap();
        fs.create_dir_all(&dir).unwrap();
        fs.write(&dir.join("c.json"), "[]").unwrap();
        fs.write(&dir.join("c.json"), "[1]").unwrap();

        assert_eq!(fs.read_to_string(&dir.join("c.json")).unwrap(), "[1]");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing/c.json");

        let result = LocalFs::new().write(&path, "[]");

        assert!(matches!(result, Err(FsError::Write { .. })));
    }
}
