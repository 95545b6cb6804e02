use super::endpoints::SupabaseEndpoints;
use super::errors::error_from_response;
use crate::config::BackendConfig;
use crate::error::{ErrorKind, FolioError};
use crate::gateway::{
    AuthApi, Backend, BlobStore, Connect, ProjectStore, Session, removable_paths,
    resolve_public_url,
};
use crate::media::LocalFile;
use crate::utils::logging::debug_backend_body;
use async_trait::async_trait;
use chrono::Utc;
use folio_schema::{
    PasswordGrant, ProjectId, ProjectInsert, ProjectPatch, ProjectRow, RefreshGrant,
    TokenResponse,
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const FOLIO_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by every gateway the connector hands out.
pub fn build_client(cfg: &BackendConfig) -> Result<reqwest::Client, FolioError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(FOLIO_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)));

    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    Ok(builder.build()?)
}

/// Gateway to one backend project over its REST APIs, holding one page session.
pub struct SupabaseGateway {
    client: reqwest::Client,
    endpoints: Arc<SupabaseEndpoints>,
    session: watch::Sender<Option<Session>>,
}

impl SupabaseGateway {
    pub fn new(client: reqwest::Client, endpoints: Arc<SupabaseEndpoints>) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            client,
            endpoints,
            session,
        }
    }

    fn publish(&self, session: Option<Session>) {
        self.session.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }

    async fn execute(
        &self,
        req: reqwest::Request,
        kind: ErrorKind,
    ) -> Result<reqwest::Response, FolioError> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        debug!(%method, path = %path, "Backend request");

        let resp = self.client.execute(req).await.inspect_err(|err| {
            warn!(%method, path = %path, error = %err, "Backend request failed");
        })?;
        if resp.status().is_success() {
            return Ok(resp);
        }

        let err = error_from_response(resp, kind).await;
        warn!(%method, path = %path, error = %err, kind = ?err.kind(), "Backend rejected request");
        if kind != ErrorKind::Auth && err.kind() == ErrorKind::Auth {
            // The token no longer works; the page session is over.
            self.publish(None);
        }
        Err(err)
    }

    /// Bearer for row and storage calls: the session token, or the anon key when signed out.
    async fn bearer(&self) -> String {
        match self.get_session().await {
            Some(session) => session.access_token,
            None => self.endpoints.anon_key().to_string(),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, FolioError> {
        let grant = RefreshGrant {
            refresh_token: refresh_token.to_string(),
        };
        let req = self.endpoints.build_refresh_grant(&self.client, &grant)?;
        let resp = self.execute(req, ErrorKind::Auth).await?;
        let token: TokenResponse = resp.json().await?;
        Ok(Session::from_token(token, Utc::now()))
    }
}

async fn decode<T: DeserializeOwned + Serialize>(resp: reqwest::Response) -> Result<T, FolioError> {
    let bytes = resp.bytes().await?;
    let value: T = serde_json::from_slice(&bytes)?;
    debug_backend_body("Backend response", &value);
    Ok(value)
}

#[async_trait]
impl AuthApi for SupabaseGateway {
    async fn get_session(&self) -> Option<Session> {
        let current = self.session.borrow().clone()?;
        if !current.is_expired_at(Utc::now()) {
            return Some(current);
        }

        match self.refresh(&current.refresh_token).await {
            Ok(session) => {
                debug!("Session refreshed");
                self.publish(Some(session.clone()));
                Some(session)
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed; signing out locally");
                self.publish(None);
                None
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, FolioError> {
        let grant = PasswordGrant {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let req = self.endpoints.build_password_grant(&self.client, &grant)?;
        let resp = self.execute(req, ErrorKind::Auth).await?;
        let token: TokenResponse = resp.json().await?;
        let session = Session::from_token(token, Utc::now());

        info!(
            user = session.user.email.as_deref().unwrap_or(&session.user.id),
            "Signed in"
        );
        self.publish(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) {
        let access_token = self
            .session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone());

        if let Some(token) = access_token {
            let result = match self.endpoints.build_logout(&self.client, &token) {
                Ok(req) => self.execute(req, ErrorKind::Auth).await.map(drop),
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                warn!(error = %err, "Sign-out request failed; dropping the local session anyway");
            }
        }

        self.publish(None);
        info!("Signed out");
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[async_trait]
impl ProjectStore for SupabaseGateway {
    async fn list_projects(&self) -> Result<Vec<ProjectRow>, FolioError> {
        let bearer = self.bearer().await;
        let req = self.endpoints.build_list(&self.client, &bearer)?;
        let resp = self.execute(req, ErrorKind::Data).await?;
        let rows: Vec<ProjectRow> = resp.json().await?;
        debug!(count = rows.len(), "Projects listed");
        Ok(rows)
    }

    async fn insert_project(&self, insert: &ProjectInsert) -> Result<ProjectRow, FolioError> {
        let bearer = self.bearer().await;
        let req = self.endpoints.build_insert(&self.client, &bearer, insert)?;
        let resp = self.execute(req, ErrorKind::Data).await?;
        decode(resp).await
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<ProjectRow, FolioError> {
        let bearer = self.bearer().await;
        let req = self
            .endpoints
            .build_update(&self.client, &bearer, id, patch)?;
        let resp = self.execute(req, ErrorKind::Data).await?;
        decode(resp).await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), FolioError> {
        let bearer = self.bearer().await;
        let req = self.endpoints.build_delete(&self.client, &bearer, id)?;
        self.execute(req, ErrorKind::Data).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SupabaseGateway {
    async fn upload(&self, path: &str, file: &LocalFile) -> Result<(), FolioError> {
        let bearer = self.bearer().await;
        let req = self
            .endpoints
            .build_upload(&self.client, &bearer, path, file)?;
        self.execute(req, ErrorKind::Storage).await?;
        debug!(path, bytes = file.len(), "Object uploaded");
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), FolioError> {
        let paths = removable_paths(paths);
        if paths.is_empty() {
            return Ok(());
        }
        let count = paths.len();
        let bearer = self.bearer().await;
        let req = self.endpoints.build_remove(&self.client, &bearer, paths)?;
        self.execute(req, ErrorKind::Storage).await?;
        debug!(count, "Objects removed");
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        resolve_public_url(path, |object| self.endpoints.object_public_url(object))
    }
}

/// Hands out one [`SupabaseGateway`] per page session over a shared client.
#[derive(Clone)]
pub struct SupabaseConnector {
    client: reqwest::Client,
    endpoints: Arc<SupabaseEndpoints>,
}

impl SupabaseConnector {
    pub fn new(client: reqwest::Client, endpoints: SupabaseEndpoints) -> Self {
        Self {
            client,
            endpoints: Arc::new(endpoints),
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, FolioError> {
        Ok(Self::new(
            build_client(cfg)?,
            SupabaseEndpoints::from_config(cfg),
        ))
    }

    pub fn gateway(&self) -> SupabaseGateway {
        SupabaseGateway::new(self.client.clone(), self.endpoints.clone())
    }
}

impl Connect for SupabaseConnector {
    fn connect(&self) -> Arc<dyn Backend> {
        Arc::new(self.gateway())
    }
}
