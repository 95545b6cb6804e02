use super::Notice;
use crate::media::PreviewId;
use folio_schema::{ProjectFields, ProjectId};

/// Snapshot of what the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    Login { error: Option<String> },
    Dashboard(DashboardView),
}

impl AdminView {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AdminView::Dashboard(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub user: Option<String>,
    pub list: ListView,
    pub editor: Option<EditorView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed,
    Empty,
    Items(Vec<ListItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: ProjectId,
    pub title: String,
    /// `"Featured · 2024-03"`, `"2024-03"` or `"Draft"`.
    pub meta: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub heading: String,
    /// `None` in create mode.
    pub project_id: Option<ProjectId>,
    pub fields: ProjectFields,
    pub thumbnail: ThumbnailView,
    pub gallery: Vec<GalleryTile>,
    pub remaining_slots: usize,
    pub can_delete: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailView {
    None,
    Stored { url: String, alt: String },
    Pending { preview: PreviewId, alt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryTile {
    Stored { path: String, url: String, alt: String },
    Pending { preview: PreviewId, name: String },
}
