//! Rows and write payloads of the `projects` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque row identifier assigned by the backend.
///
/// Depending on the table definition the backend hands out integers or uuids; both are kept as
/// text so the rest of the crate never has to care.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            _ => Err(serde::de::Error::custom(
                "expected a string or a number for project id",
            )),
        }
    }
}

/// A persisted `projects` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: ProjectId,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub tech_stack: Option<String>,

    #[serde(default)]
    pub launched_on: Option<String>,

    #[serde(default)]
    pub cta_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,

    /// Storage path or absolute URL of the cover image.
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Storage paths or absolute URLs, at most 10.
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery_urls: Vec<String>,

    /// Rotation interval for the card's image strip, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_interval: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProjectRow {
    /// Title if present and non-blank, otherwise `fallback`.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.title.as_ref()).unwrap_or(fallback)
    }

    /// The editable columns of this row.
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            title: self.title.clone(),
            summary: self.summary.clone(),
            tech_stack: self.tech_stack.clone(),
            launched_on: self.launched_on.clone(),
            cta_url: self.cta_url.clone(),
            is_featured: self.is_featured,
        }
    }

    /// Applies a partial update the way the backend does: only present keys change.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(fields) = &patch.fields {
            self.title.clone_from(&fields.title);
            self.summary.clone_from(&fields.summary);
            self.tech_stack.clone_from(&fields.tech_stack);
            self.launched_on.clone_from(&fields.launched_on);
            self.cta_url.clone_from(&fields.cta_url);
            self.is_featured = fields.is_featured;
        }
        if let Some(thumbnail_url) = &patch.thumbnail_url {
            self.thumbnail_url = Some(thumbnail_url.clone());
        }
        if let Some(gallery_urls) = &patch.gallery_urls {
            self.gallery_urls.clone_from(gallery_urls);
        }
    }
}

/// Trimmed, non-empty view of an optional text column.
pub fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Editable text columns plus the featured flag.
///
/// Empty form inputs are stored as `null`, so clearing a field in the editor clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tech_stack: Option<String>,
    pub launched_on: Option<String>,
    pub cta_url: Option<String>,
    pub is_featured: bool,
}

/// `POST /rest/v1/projects` body.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectInsert {
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub gallery_urls: Vec<String>,
}

/// `PATCH /rest/v1/projects?id=eq.{id}` body. `None` => column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(flatten)]
    pub fields: Option<ProjectFields>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_urls: Option<Vec<String>>,
}

impl ProjectPatch {
    pub fn thumbnail(path: impl Into<String>) -> Self {
        Self {
            thumbnail_url: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn gallery(paths: Vec<String>) -> Self {
        Self {
            gallery_urls: Some(paths),
            ..Self::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
