use crate::config::BackendConfig;
use crate::error::FolioError;
use crate::media::LocalFile;
use folio_schema::{
    PasswordGrant, ProjectId, ProjectInsert, ProjectPatch, RefreshGrant, RemoveObjectsBody,
};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use url::Url;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const UPLOAD_CACHE_CONTROL: &str = "max-age=3600";

/// Request builders for the auth, row and storage APIs of one backend project.
#[derive(Debug, Clone)]
pub struct SupabaseEndpoints {
    /// `None` while the configured URL is a placeholder or otherwise unparsable.
    base: Option<Url>,
    raw_base: String,
    anon_key: String,
    table: String,
    bucket: String,
}

impl SupabaseEndpoints {
    pub fn new(
        base: &str,
        anon_key: impl Into<String>,
        table: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        let raw_base = base.trim().to_string();
        let base = Url::parse(&raw_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base());
        Self {
            base,
            raw_base,
            anon_key: anon_key.into(),
            table: table.into(),
            bucket: bucket.into(),
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Self {
        Self::new(
            &cfg.url,
            cfg.anon_key.clone(),
            cfg.projects_table.clone(),
            cfg.storage_bucket.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.base.is_some()
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, FolioError> {
        let mut url = self.base.clone().ok_or_else(|| {
            FolioError::Config(format!(
                "backend.url {:?} is not a usable base URL",
                self.raw_base
            ))
        })?;
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| FolioError::Config("backend.url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
        bearer: &str,
    ) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    pub fn build_password_grant(
        &self,
        client: &reqwest::Client,
        grant: &PasswordGrant,
    ) -> Result<reqwest::Request, FolioError> {
        let mut url = self.url(["auth", "v1", "token"])?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        Ok(self
            .authorized(client.post(url), &self.anon_key)
            .json(grant)
            .build()?)
    }

    pub fn build_refresh_grant(
        &self,
        client: &reqwest::Client,
        grant: &RefreshGrant,
    ) -> Result<reqwest::Request, FolioError> {
        let mut url = self.url(["auth", "v1", "token"])?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");
        Ok(self
            .authorized(client.post(url), &self.anon_key)
            .json(grant)
            .build()?)
    }

    pub fn build_logout(
        &self,
        client: &reqwest::Client,
        access_token: &str,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["auth", "v1", "logout"])?;
        Ok(self.authorized(client.post(url), access_token).build()?)
    }

    pub fn build_list(
        &self,
        client: &reqwest::Client,
        bearer: &str,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["rest", "v1", self.table.as_str()])?;
        Ok(self
            .authorized(client.get(url), bearer)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .build()?)
    }

    pub fn build_insert(
        &self,
        client: &reqwest::Client,
        bearer: &str,
        insert: &ProjectInsert,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["rest", "v1", self.table.as_str()])?;
        Ok(self
            .authorized(client.post(url), bearer)
            .header("Prefer", RETURN_REPRESENTATION)
            .header(ACCEPT, SINGLE_OBJECT)
            .json(insert)
            .build()?)
    }

    pub fn build_update(
        &self,
        client: &reqwest::Client,
        bearer: &str,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["rest", "v1", self.table.as_str()])?;
        Ok(self
            .authorized(client.patch(url), bearer)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_REPRESENTATION)
            .header(ACCEPT, SINGLE_OBJECT)
            .json(patch)
            .build()?)
    }

    pub fn build_delete(
        &self,
        client: &reqwest::Client,
        bearer: &str,
        id: &ProjectId,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["rest", "v1", self.table.as_str()])?;
        Ok(self
            .authorized(client.delete(url), bearer)
            .query(&[("id", format!("eq.{id}"))])
            .build()?)
    }

    pub fn build_upload(
        &self,
        client: &reqwest::Client,
        bearer: &str,
        path: &str,
        file: &LocalFile,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(
            ["storage", "v1", "object", self.bucket.as_str()]
                .into_iter()
                .chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        Ok(self
            .authorized(client.post(url), bearer)
            .header(CONTENT_TYPE, file.content_type())
            .header(CACHE_CONTROL, UPLOAD_CACHE_CONTROL)
            .header("x-upsert", "true")
            .body(file.bytes().clone())
            .build()?)
    }

    pub fn build_remove(
        &self,
        client: &reqwest::Client,
        bearer: &str,
        paths: Vec<String>,
    ) -> Result<reqwest::Request, FolioError> {
        let url = self.url(["storage", "v1", "object", self.bucket.as_str()])?;
        Ok(self
            .authorized(client.delete(url), bearer)
            .json(&RemoveObjectsBody { prefixes: paths })
            .build()?)
    }

    /// Public URL of an object in the bucket.
    pub fn object_public_url(&self, path: &str) -> Option<String> {
        self.url(
            ["storage", "v1", "object", "public", self.bucket.as_str()]
                .into_iter()
                .chain(path.split('/').filter(|s| !s.is_empty())),
        )
        .ok()
        .map(String::from)
    }
}
