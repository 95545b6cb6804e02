use super::view::{
    AdminView, DashboardView, EditorView, GalleryTile, ListItem, ListView, ThumbnailView,
};
use super::{
    DELETE_FAILED, DRAFT, FEATURED, LoginForm, NEW_PROJECT, PROJECT_CREATED, PROJECT_SAVED,
    UNTITLED, UNTITLED_LIST_ITEM,
};
use crate::error::FolioError;
use crate::gateway::{Backend, Session};
use crate::media::{
    LocalFile, MAX_GALLERY_IMAGES, PendingMedia, PreviewId, PreviewStore, partition_gallery,
    storage_object, storage_path,
};
use folio_schema::{ProjectFields, ProjectId, ProjectInsert, ProjectPatch, ProjectRow, non_empty};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// State of the cached project list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    Failed,
}

/// Inline editor message; a new action clears the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

/// Open editor. `current` is `None` in create mode.
#[derive(Debug)]
struct Editor {
    current: Option<ProjectRow>,
    draft: ProjectFields,
}

/// One admin page session.
///
/// Holds the session gate, the cached project list and the open editor with its pending media.
/// Every named dashboard action is a method; callers serialize access, so a save never
/// interleaves with another action of the same session.
pub struct AdminController {
    backend: Arc<dyn Backend>,
    session: watch::Receiver<Option<Session>>,
    authenticated: bool,
    user: Option<String>,
    login_error: Option<String>,
    projects: Vec<ProjectRow>,
    list: ListStatus,
    editor: Option<Editor>,
    pending: PendingMedia,
    previews: PreviewStore,
    notice: Option<Notice>,
}

impl AdminController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let session = backend.subscribe();
        Self {
            backend,
            session,
            authenticated: false,
            user: None,
            login_error: None,
            projects: Vec::new(),
            list: ListStatus::Loading,
            editor: None,
            pending: PendingMedia::default(),
            previews: PreviewStore::default(),
            notice: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn projects(&self) -> &[ProjectRow] {
        &self.projects
    }

    pub fn list_status(&self) -> ListStatus {
        self.list
    }

    pub fn current_project(&self) -> Option<&ProjectRow> {
        self.editor.as_ref().and_then(|editor| editor.current.as_ref())
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor.is_some()
    }

    pub fn pending(&self) -> &PendingMedia {
        &self.pending
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    pub fn preview(&self, id: PreviewId) -> Option<&LocalFile> {
        self.previews.get(id)
    }

    /// Page load: shows the dashboard if a session exists, the login form otherwise.
    pub async fn start(&mut self) {
        self.ensure_session().await;
    }

    async fn ensure_session(&mut self) {
        let Some(session) = self.backend.get_session().await else {
            self.show_login();
            return;
        };

        self.authenticated = true;
        self.login_error = None;
        self.user = session.user.email.clone();
        // The list shows its own failure state; nothing else to do here.
        let _ = self.refresh().await;
    }

    pub async fn login(&mut self, form: LoginForm) -> Result<(), FolioError> {
        self.login_error = None;
        if let Err(err) = self.backend.sign_in(&form.email, &form.password).await {
            warn!(email = %form.email.trim(), error = %err, "Sign-in rejected");
            self.login_error = Some(err.user_message());
            self.show_login();
            return Err(err);
        }
        // Our own sign-in is not a session change to react to.
        self.session.mark_unchanged();
        self.ensure_session().await;
        Ok(())
    }

    pub async fn sign_out(&mut self) {
        self.backend.sign_out().await;
        self.session.mark_unchanged();
        self.login_error = None;
        self.show_login();
    }

    /// Applies a session change published by the backend since the last action.
    pub fn sync_session(&mut self) {
        if self.session.has_changed().unwrap_or(false) {
            let session = self.session.borrow_and_update().clone();
            self.on_session_change(session.as_ref());
        }
    }

    /// A missing session forces the login form, whatever the dashboard was doing.
    pub fn on_session_change(&mut self, session: Option<&Session>) {
        match session {
            None if self.authenticated => {
                info!("Session ended; returning to sign-in");
                self.show_login();
            }
            None => {}
            Some(session) => {
                self.user.clone_from(&session.user.email);
            }
        }
    }

    fn show_login(&mut self) {
        self.authenticated = false;
        self.user = None;
        self.projects.clear();
        self.list = ListStatus::Loading;
        self.close_editor();
    }

    /// Reloads the project list from the backend.
    pub async fn refresh(&mut self) -> Result<(), FolioError> {
        self.list = ListStatus::Loading;
        match self.backend.list_projects().await {
            Ok(rows) => {
                debug!(count = rows.len(), "Project list loaded");
                self.projects = rows;
                self.list = ListStatus::Ready;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to load projects");
                self.list = ListStatus::Failed;
                Err(err)
            }
        }
    }

    /// Opens an empty editor in create mode.
    pub fn open_new(&mut self) {
        self.open_editor(None);
    }

    /// Opens the editor on a cached project.
    pub fn open_project(&mut self, id: &ProjectId) -> Result<(), FolioError> {
        let row = self
            .projects
            .iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| FolioError::InvalidRequest(format!("unknown project {id}")))?;
        self.open_editor(Some(row));
        Ok(())
    }

    fn open_editor(&mut self, current: Option<ProjectRow>) {
        self.reset_editor();
        let draft = current.as_ref().map(ProjectRow::fields).unwrap_or_default();
        self.editor = Some(Editor { current, draft });
    }

    /// Drops pending media, releasing every preview, and clears the notice.
    fn reset_editor(&mut self) {
        self.pending.clear(&mut self.previews);
        self.notice = None;
    }

    fn close_editor(&mut self) {
        self.reset_editor();
        self.editor = None;
    }

    /// Discards pending media and closes the editor without touching the backend.
    pub fn cancel(&mut self) {
        self.close_editor();
    }

    /// Keeps unsaved text inputs across actions that re-render the editor.
    pub fn update_draft(&mut self, fields: ProjectFields) {
        if let Some(editor) = self.editor.as_mut() {
            editor.draft = fields;
        }
    }

    /// Replaces the pending thumbnail; `None` clears it.
    pub fn choose_thumbnail(&mut self, file: Option<LocalFile>) -> Option<PreviewId> {
        if self.editor.is_none() {
            return None;
        }
        self.pending.set_thumbnail(&mut self.previews, file)
    }

    /// Queues gallery files up to the free slots; the rest are dropped.
    pub fn choose_gallery(&mut self, files: Vec<LocalFile>) -> Vec<PreviewId> {
        let Some(editor) = self.editor.as_ref() else {
            return Vec::new();
        };
        let existing = editor
            .current
            .as_ref()
            .map_or(0, |row| row.gallery_urls.len());
        let offered = files.len();
        let accepted = self.pending.add_gallery(&mut self.previews, existing, files);
        if accepted.len() < offered {
            debug!(
                offered,
                accepted = accepted.len(),
                "Gallery is full; extra files dropped"
            );
        }
        accepted
    }

    /// Marks a persisted gallery image for removal on the next save.
    pub fn remove_gallery_image(&mut self, path: &str) -> bool {
        let persisted = self
            .current_project()
            .is_some_and(|row| row.gallery_urls.iter().any(|p| p == path));
        persisted && self.pending.mark_removed(path)
    }

    /// Drops a queued gallery file without contacting the backend.
    pub fn remove_pending_upload(&mut self, preview: PreviewId) -> bool {
        self.pending.remove_pending(&mut self.previews, preview)
    }

    /// Saves the open editor: creates a project in create mode, updates it in edit mode.
    ///
    /// On failure pending media stays queued and the message is shown inline. A create that
    /// failed after its insert leaves the editor on the new row.
    pub async fn submit(&mut self, fields: ProjectFields) -> Result<ProjectRow, FolioError> {
        let Some(editor) = self.editor.as_mut() else {
            return Err(FolioError::InvalidRequest("no project is open".to_string()));
        };
        editor.draft = fields.clone();
        let current = editor.current.clone();

        self.notice = None;
        let result = match &current {
            None => self.create(fields).await,
            Some(row) => self.save_existing(row, fields).await,
        };

        match result {
            Ok(row) => {
                let message = if current.is_some() {
                    PROJECT_SAVED
                } else {
                    PROJECT_CREATED
                };
                self.open_editor(Some(row.clone()));
                self.notice = Some(Notice::Success(message.to_string()));
                Ok(row)
            }
            Err(err) => {
                error!(
                    project = current.as_ref().map_or("<new>", |row| row.id.as_str()),
                    error = %err,
                    "Save failed"
                );
                self.notice = Some(Notice::Error(err.user_message()));
                Err(err)
            }
        }
    }

    async fn create(&mut self, fields: ProjectFields) -> Result<ProjectRow, FolioError> {
        let insert = ProjectInsert {
            fields,
            gallery_urls: Vec::new(),
        };
        let mut row = self.backend.insert_project(&insert).await?;
        info!(project = %row.id, "Project created");
        self.projects.insert(0, row.clone());

        let attached = self.attach_new_media(&mut row).await;
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == row.id) {
            *slot = row.clone();
        }
        if let Err(err) = attached {
            // Pending media stays queued; the next save edits this row instead of inserting.
            warn!(project = %row.id, error = %err, "Project created but its media was not attached");
            if let Some(editor) = self.editor.as_mut() {
                editor.current = Some(row);
            }
            return Err(err);
        }
        Ok(row)
    }

    async fn attach_new_media(&self, row: &mut ProjectRow) -> Result<(), FolioError> {
        if let Some(upload) = self.pending.thumbnail() {
            let path = storage_path(&row.id, "thumbnail", &upload.file);
            self.backend.upload(&path, &upload.file).await?;
            *row = self
                .backend
                .update_project(&row.id, &ProjectPatch::thumbnail(path))
                .await?;
        }

        if !self.pending.gallery().is_empty() {
            let mut paths = Vec::with_capacity(self.pending.gallery().len());
            for (index, upload) in self
                .pending
                .gallery()
                .iter()
                .take(MAX_GALLERY_IMAGES)
                .enumerate()
            {
                let path = storage_path(&row.id, &format!("gallery-{index}"), &upload.file);
                self.backend.upload(&path, &upload.file).await?;
                paths.push(path);
            }
            *row = self
                .backend
                .update_project(&row.id, &ProjectPatch::gallery(paths))
                .await?;
        }

        Ok(())
    }

    async fn save_existing(
        &mut self,
        current: &ProjectRow,
        fields: ProjectFields,
    ) -> Result<ProjectRow, FolioError> {
        let (mut gallery, removed) =
            partition_gallery(&current.gallery_urls, self.pending.removals());
        if !removed.is_empty() {
            self.backend.remove(&removed).await?;
        }

        let start = gallery.len();
        let slots = MAX_GALLERY_IMAGES.saturating_sub(start);
        for (offset, upload) in self.pending.gallery().iter().take(slots).enumerate() {
            let prefix = format!("gallery-{}", start + offset);
            let path = storage_path(&current.id, &prefix, &upload.file);
            self.backend.upload(&path, &upload.file).await?;
            gallery.push(path);
        }
        gallery.truncate(MAX_GALLERY_IMAGES);

        let mut patch = ProjectPatch {
            fields: Some(fields),
            thumbnail_url: None,
            gallery_urls: Some(gallery),
        };

        if let Some(upload) = self.pending.thumbnail() {
            let path = storage_path(&current.id, "thumbnail", &upload.file);
            self.backend.upload(&path, &upload.file).await?;
            if let Some(previous) = current.thumbnail_url.as_deref().and_then(storage_object) {
                self.backend.remove(&[previous.to_string()]).await?;
            }
            patch.thumbnail_url = Some(path);
        }

        let row = self.backend.update_project(&current.id, &patch).await?;
        info!(project = %row.id, "Project saved");

        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == row.id) {
            *slot = row.clone();
        }
        Ok(row)
    }

    /// Deletes the project in the editor. Returns `Ok(false)` when nothing was done.
    ///
    /// The row goes first; its images are removed afterwards and a failure there is only
    /// logged.
    pub async fn delete(&mut self, confirmed: bool) -> Result<bool, FolioError> {
        let Some(current) = self.current_project().cloned() else {
            return Ok(false);
        };
        if !confirmed {
            return Ok(false);
        }

        self.notice = None;
        let result = self.backend.delete_project(&current.id).await;

        if let Err(err) = result {
            error!(project = %current.id, error = %err, "Delete failed");
            self.notice = Some(Notice::Error(err.user_message_or(DELETE_FAILED)));
            return Err(err);
        }
        info!(project = %current.id, "Project deleted");

        let media: Vec<String> = current
            .thumbnail_url
            .iter()
            .chain(current.gallery_urls.iter())
            .cloned()
            .collect();
        if let Err(err) = self.backend.remove(&media).await {
            warn!(project = %current.id, error = %err, "Project deleted but its images were not removed");
        }

        self.projects.retain(|row| row.id != current.id);
        self.close_editor();
        Ok(true)
    }

    pub fn view(&self) -> AdminView {
        if !self.authenticated {
            return AdminView::Login {
                error: self.login_error.clone(),
            };
        }

        AdminView::Dashboard(DashboardView {
            user: self.user.clone(),
            list: self.list_view(),
            editor: self.editor.as_ref().map(|editor| self.editor_view(editor)),
        })
    }

    fn list_view(&self) -> ListView {
        match self.list {
            ListStatus::Loading => ListView::Loading,
            ListStatus::Failed => ListView::Failed,
            ListStatus::Ready if self.projects.is_empty() => ListView::Empty,
            ListStatus::Ready => {
                let active = self.current_project().map(|row| &row.id);
                ListView::Items(
                    self.projects
                        .iter()
                        .map(|row| ListItem {
                            id: row.id.clone(),
                            title: row.title_or(UNTITLED_LIST_ITEM).to_string(),
                            meta: list_meta(row),
                            active: active == Some(&row.id),
                        })
                        .collect(),
                )
            }
        }
    }

    fn editor_view(&self, editor: &Editor) -> EditorView {
        let current = editor.current.as_ref();
        let title = current.map_or(UNTITLED, |row| row.title_or(UNTITLED));
        let heading = match current {
            Some(_) => format!("Editing: {title}"),
            None => NEW_PROJECT.to_string(),
        };

        let thumbnail = if let Some(upload) = self.pending.thumbnail() {
            ThumbnailView::Pending {
                preview: upload.preview,
                alt: format!("{} preview", upload.file.name()),
            }
        } else {
            current
                .and_then(|row| row.thumbnail_url.as_deref())
                .and_then(|path| self.backend.public_url(path))
                .map_or(ThumbnailView::None, |url| ThumbnailView::Stored {
                    url,
                    alt: format!("{title} thumbnail"),
                })
        };

        let existing = current.map_or(&[][..], |row| row.gallery_urls.as_slice());
        let mut gallery: Vec<GalleryTile> = existing
            .iter()
            .filter(|path| !self.pending.is_removed(path))
            .map(|path| GalleryTile::Stored {
                path: path.clone(),
                url: self
                    .backend
                    .public_url(path)
                    .unwrap_or_else(|| path.clone()),
                alt: format!("{title} gallery image"),
            })
            .collect();
        gallery.extend(
            self.pending
                .gallery()
                .iter()
                .map(|upload| GalleryTile::Pending {
                    preview: upload.preview,
                    name: upload.file.name().to_string(),
                }),
        );

        EditorView {
            heading,
            project_id: current.map(|row| row.id.clone()),
            fields: editor.draft.clone(),
            thumbnail,
            gallery,
            remaining_slots: self.pending.remaining_slots(existing.len()),
            can_delete: current.is_some(),
            notice: self.notice.clone(),
        }
    }
}

/// `"Featured · {launched_on}"` pieces, or `"Draft"` when there are none.
fn list_meta(row: &ProjectRow) -> String {
    let mut flags = Vec::with_capacity(2);
    if row.is_featured {
        flags.push(FEATURED);
    }
    if let Some(launched_on) = non_empty(row.launched_on.as_ref()) {
        flags.push(launched_on);
    }
    if flags.is_empty() {
        DRAFT.to_string()
    } else {
        flags.join(" · ")
    }
}
