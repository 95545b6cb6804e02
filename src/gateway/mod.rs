//! Backend gateway: session auth, the `projects` table and the project image bucket.
//!
//! The three capabilities are separate traits so callers can ask for exactly what they use;
//! [`Backend`] bundles them for the controller and the renderer. Gateways are single-shot:
//! no retries, no caching, failures go straight back to the caller.

mod memory;
mod session;
mod supabase;

pub use memory::{GatewayCall, MemoryBackend, MemoryStore, Operation};
pub use session::{Session, SessionUser};
pub use supabase::{SupabaseConnector, SupabaseEndpoints, SupabaseGateway, build_client};

use crate::error::FolioError;
use crate::media::{LocalFile, is_absolute_url};
use async_trait::async_trait;
use folio_schema::{ProjectId, ProjectInsert, ProjectPatch, ProjectRow};
use std::sync::Arc;
use tokio::sync::watch;

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Current session, refreshed if it expired; `None` when signed out.
    async fn get_session(&self) -> Option<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, FolioError>;

    /// Always ends the local session, even if the backend call fails.
    async fn sign_out(&self);

    /// Observes every session change, including the session disappearing.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All rows, newest `created_at` first.
    async fn list_projects(&self) -> Result<Vec<ProjectRow>, FolioError>;

    async fn insert_project(&self, insert: &ProjectInsert) -> Result<ProjectRow, FolioError>;

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<ProjectRow, FolioError>;

    async fn delete_project(&self, id: &ProjectId) -> Result<(), FolioError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `file` at `path`, replacing any existing object.
    async fn upload(&self, path: &str, file: &LocalFile) -> Result<(), FolioError>;

    /// Removes objects; paths that do not exist are ignored.
    async fn remove(&self, paths: &[String]) -> Result<(), FolioError>;

    /// Viewable URL for a stored reference.
    fn public_url(&self, path: &str) -> Option<String>;
}

/// Everything the dashboard and the gallery need from the backend.
pub trait Backend: AuthApi + ProjectStore + BlobStore {}

impl<T: AuthApi + ProjectStore + BlobStore + ?Sized> Backend for T {}

/// Hands out a fresh gateway (with its own session) per page session.
pub trait Connect: Send + Sync {
    fn connect(&self) -> Arc<dyn Backend>;
}

/// Shared `public_url` rules: blank => `None`, absolute URL => itself, else `object_url(path)`.
///
/// If the object URL cannot be built the reference is returned unchanged.
pub(crate) fn resolve_public_url(
    path: &str,
    object_url: impl FnOnce(&str) -> Option<String>,
) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if is_absolute_url(path) {
        return Some(path.to_string());
    }
    object_url(path).or_else(|| Some(path.to_string()))
}

/// Non-empty storage paths only; absolute URLs and blanks are not objects in the bucket.
pub(crate) fn removable_paths(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| crate::media::storage_object(p))
        .map(str::to_string)
        .collect()
}
