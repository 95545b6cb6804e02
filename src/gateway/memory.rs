//! In-process backend used by the test-suite.
//!
//! Behaves like the hosted backend where the dashboard can tell the difference: writes need a
//! session, rows come back newest first, uploads upsert and removals ignore unknown paths.
//! Every call is recorded and any operation can be made to fail once.

use crate::error::FolioError;
use crate::gateway::{
    AuthApi, Backend, BlobStore, Connect, ProjectStore, Session, SessionUser, removable_paths,
    resolve_public_url,
};
use crate::media::LocalFile;
use ahash::AHashMap;
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use folio_schema::{ProjectId, ProjectInsert, ProjectPatch, ProjectRow};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// 2024-01-01T00:00:00Z; the logical clock stamps rows one minute apart from here.
const CLOCK_EPOCH_SECS: i64 = 1_704_067_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SignIn,
    SignOut,
    List,
    Insert,
    Update,
    Delete,
    Upload,
    Remove,
}

/// One recorded gateway call.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    SignIn { email: String },
    SignOut,
    List,
    Insert(ProjectInsert),
    Update { id: ProjectId, patch: ProjectPatch },
    Delete { id: ProjectId },
    Upload { path: String, content_type: String },
    Remove { paths: Vec<String> },
}

impl GatewayCall {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayCall::SignIn { .. } => Operation::SignIn,
            GatewayCall::SignOut => Operation::SignOut,
            GatewayCall::List => Operation::List,
            GatewayCall::Insert(_) => Operation::Insert,
            GatewayCall::Update { .. } => Operation::Update,
            GatewayCall::Delete { .. } => Operation::Delete,
            GatewayCall::Upload { .. } => Operation::Upload,
            GatewayCall::Remove { .. } => Operation::Remove,
        }
    }
}

#[derive(Default)]
struct StoreInner {
    rows: Vec<ProjectRow>,
    blobs: AHashMap<String, LocalFile>,
    users: AHashMap<String, String>,
    calls: Vec<GatewayCall>,
    failures: AHashMap<Operation, FolioError>,
    next_id: u64,
    ticks: i64,
}

impl StoreInner {
    fn tick(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::from_timestamp(CLOCK_EPOCH_SECS + self.ticks * 60, 0).unwrap_or_default()
    }

    fn next_id(&mut self) -> ProjectId {
        self.next_id += 1;
        ProjectId::new(self.next_id.to_string())
    }

    /// Records `call` and hands back the failure queued for it, if any.
    fn record(&mut self, call: GatewayCall) -> Result<(), FolioError> {
        let op = call.operation();
        self.calls.push(call);
        self.failures.remove(&op).map_or(Ok(()), Err)
    }
}

/// Shared state behind any number of [`MemoryBackend`] sessions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an account that can sign in.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.lock()
            .users
            .insert(email.to_string(), password.to_string());
        self
    }

    /// Stores a row as-is; a missing `created_at` is stamped from the logical clock.
    pub fn seed(&self, mut row: ProjectRow) -> ProjectRow {
        let mut inner = self.lock();
        if row.created_at.is_none() {
            row.created_at = Some(inner.tick());
        }
        inner.rows.retain(|existing| existing.id != row.id);
        inner.rows.push(row.clone());
        row
    }

    pub fn seed_blob(&self, path: &str) {
        let file = LocalFile::new(path.rsplit('/').next().unwrap_or(path), None, Vec::new());
        self.lock().blobs.insert(path.to_string(), file);
    }

    /// Rows newest first, as the backend lists them.
    pub fn projects(&self) -> Vec<ProjectRow> {
        let mut rows = self.lock().rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn project(&self, id: &ProjectId) -> Option<ProjectRow> {
        self.lock().rows.iter().find(|row| &row.id == id).cloned()
    }

    pub fn blob_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().blobs.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn has_blob(&self, path: &str) -> bool {
        self.lock().blobs.contains_key(path)
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock().calls.iter().map(GatewayCall::operation).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// The next call of `op` fails with `err`.
    pub fn fail_next(&self, op: Operation, err: FolioError) {
        self.lock().failures.insert(op, err);
    }

    /// A fresh, signed-out page session.
    pub fn backend(&self) -> MemoryBackend {
        let (session, _) = watch::channel(None);
        MemoryBackend {
            store: self.clone(),
            session,
        }
    }
}

impl Connect for MemoryStore {
    fn connect(&self) -> Arc<dyn Backend> {
        Arc::new(self.backend())
    }
}

/// One page session against a [`MemoryStore`].
pub struct MemoryBackend {
    store: MemoryStore,
    session: watch::Sender<Option<Session>>,
}

impl MemoryBackend {
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Drops the session without a sign-out call, as an expired refresh would.
    pub fn end_session(&self) {
        self.session.send_replace(None);
    }

    fn signed_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    fn require_session(&self) -> Result<(), FolioError> {
        if self.signed_in() {
            Ok(())
        } else {
            Err(FolioError::Data {
                status: Some(StatusCode::FORBIDDEN),
                message: "new row violates row-level security policy for table \"projects\""
                    .to_string(),
            })
        }
    }

    fn require_storage_session(&self) -> Result<(), FolioError> {
        if self.signed_in() {
            Ok(())
        } else {
            Err(FolioError::Storage {
                status: Some(StatusCode::FORBIDDEN),
                message: "new row violates row-level security policy".to_string(),
            })
        }
    }
}

#[async_trait]
impl AuthApi for MemoryBackend {
    async fn get_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, FolioError> {
        let email = email.trim();
        let session = {
            let mut inner = self.store.lock();
            inner.record(GatewayCall::SignIn {
                email: email.to_string(),
            })?;
            if inner.users.get(email).is_none_or(|known| known != password) {
                return Err(FolioError::Auth {
                    status: Some(StatusCode::BAD_REQUEST),
                    message: "Invalid login credentials".to_string(),
                });
            }
            let serial = inner.calls.len();
            Session {
                access_token: format!("memory-access-{serial}"),
                refresh_token: format!("memory-refresh-{serial}"),
                expires_at: Some(Utc::now() + Duration::hours(1)),
                user: SessionUser {
                    id: format!("user-{email}"),
                    email: Some(email.to_string()),
                },
            }
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) {
        // Sign-out always ends the local session, so an injected failure is ignored here.
        let _ = self.store.lock().record(GatewayCall::SignOut);
        self.session.send_replace(None);
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[async_trait]
impl ProjectStore for MemoryBackend {
    async fn list_projects(&self) -> Result<Vec<ProjectRow>, FolioError> {
        self.store.lock().record(GatewayCall::List)?;
        Ok(self.store.projects())
    }

    async fn insert_project(&self, insert: &ProjectInsert) -> Result<ProjectRow, FolioError> {
        let mut inner = self.store.lock();
        inner.record(GatewayCall::Insert(insert.clone()))?;
        self.require_session()?;

        let fields = insert.fields.clone();
        let row = ProjectRow {
            id: inner.next_id(),
            title: fields.title,
            summary: fields.summary,
            tech_stack: fields.tech_stack,
            launched_on: fields.launched_on,
            cta_url: fields.cta_url,
            is_featured: fields.is_featured,
            thumbnail_url: None,
            gallery_urls: insert.gallery_urls.clone(),
            gallery_interval: None,
            created_at: Some(inner.tick()),
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<ProjectRow, FolioError> {
        let mut inner = self.store.lock();
        inner.record(GatewayCall::Update {
            id: id.clone(),
            patch: patch.clone(),
        })?;
        self.require_session()?;

        let row = inner
            .rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or_else(|| FolioError::Data {
                status: Some(StatusCode::NOT_ACCEPTABLE),
                message: "JSON object requested, multiple (or no) rows returned".to_string(),
            })?;
        row.apply(patch);
        Ok(row.clone())
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), FolioError> {
        let mut inner = self.store.lock();
        inner.record(GatewayCall::Delete { id: id.clone() })?;
        self.require_session()?;
        inner.rows.retain(|row| &row.id != id);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn upload(&self, path: &str, file: &LocalFile) -> Result<(), FolioError> {
        let mut inner = self.store.lock();
        inner.record(GatewayCall::Upload {
            path: path.to_string(),
            content_type: file.content_type().to_string(),
        })?;
        self.require_storage_session()?;
        inner.blobs.insert(path.to_string(), file.clone());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), FolioError> {
        let paths = removable_paths(paths);
        if paths.is_empty() {
            return Ok(());
        }
        let mut inner = self.store.lock();
        inner.record(GatewayCall::Remove {
            paths: paths.clone(),
        })?;
        self.require_storage_session()?;
        for path in &paths {
            inner.blobs.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        resolve_public_url(path, |object| {
            Some(format!("memory://project-images/{object}"))
        })
    }
}
