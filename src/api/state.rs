//! Application state for the API server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::snapshot::{ArtifactFs, JobOptions};
use crate::store::Connector;

/// Shared application state.
///
/// Generic over `C: Connector` (MongoDB in production, the in-memory store in
/// tests) and `F: ArtifactFs` (local disk, or a mock). Dependencies are
/// injected via the constructor, not created internally.
pub struct AppState<C: Connector, F: ArtifactFs> {
    connector: Arc<C>,
    fs: Arc<F>,
    exports_dir: PathBuf,
    options: JobOptions,
    api_token: Option<Arc<str>>,
}

// Manual Clone impl - only the Arcs are cloned, C and F need not be Clone
impl<C: Connector, F: ArtifactFs> Clone for AppState<C, F> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            fs: Arc::clone(&self.fs),
            exports_dir: self.exports_dir.clone(),
            options: self.options,
            api_token: self.api_token.clone(),
        }
    }
}

impl<C: Connector, F: ArtifactFs> AppState<C, F> {
    /// Create a new AppState.
    ///
    /// - `connector`: opens one store connection per job
    /// - `fs`: artifact filesystem
    /// - `exports_dir`: snapshot root, written by export and read by import
    /// - `options`: concurrency and import layout for every job
    pub fn new(connector: C, fs: F, exports_dir: PathBuf, options: JobOptions) -> Self {
        Self {
            connector: Arc::new(connector),
            fs: Arc::new(fs),
            exports_dir,
            options,
            api_token: None,
        }
    }

    /// Require `Authorization: Bearer <token>` on the snapshot endpoints.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}
