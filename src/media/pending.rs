use crate::media::{LocalFile, MAX_GALLERY_IMAGES, PreviewId, PreviewStore};
use ahash::AHashSet;
use folio_schema::ProjectId;
use uuid::Uuid;

/// A chosen file paired with its local preview.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file: LocalFile,
    pub preview: PreviewId,
}

/// Unsaved media changes of the open editor.
#[derive(Debug, Default)]
pub struct PendingMedia {
    thumbnail: Option<PendingUpload>,
    gallery: Vec<PendingUpload>,
    removals: AHashSet<String>,
}

impl PendingMedia {
    pub fn thumbnail(&self) -> Option<&PendingUpload> {
        self.thumbnail.as_ref()
    }

    pub fn gallery(&self) -> &[PendingUpload] {
        &self.gallery
    }

    pub fn removals(&self) -> &AHashSet<String> {
        &self.removals
    }

    pub fn is_removed(&self, path: &str) -> bool {
        self.removals.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnail.is_none() && self.gallery.is_empty() && self.removals.is_empty()
    }

    /// Replaces the pending thumbnail; `None` clears it. The superseded preview is released.
    pub fn set_thumbnail(
        &mut self,
        previews: &mut PreviewStore,
        file: Option<LocalFile>,
    ) -> Option<PreviewId> {
        if let Some(old) = self.thumbnail.take() {
            previews.release(old.preview);
        }
        self.thumbnail = file.map(|file| {
            let preview = previews.create(&file);
            PendingUpload { file, preview }
        });
        self.thumbnail.as_ref().map(|upload| upload.preview)
    }

    /// Gallery slots still free given `existing` persisted images.
    pub fn remaining_slots(&self, existing: usize) -> usize {
        let kept = existing.saturating_sub(self.removals.len());
        MAX_GALLERY_IMAGES
            .saturating_sub(kept)
            .saturating_sub(self.gallery.len())
    }

    /// Queues as many `files` as fit; the rest are dropped. Returns the previews of accepted files.
    pub fn add_gallery(
        &mut self,
        previews: &mut PreviewStore,
        existing: usize,
        files: Vec<LocalFile>,
    ) -> Vec<PreviewId> {
        let slots = self.remaining_slots(existing);
        files
            .into_iter()
            .take(slots)
            .map(|file| {
                let preview = previews.create(&file);
                self.gallery.push(PendingUpload { file, preview });
                preview
            })
            .collect()
    }

    /// Drops a queued gallery file and releases its preview.
    pub fn remove_pending(&mut self, previews: &mut PreviewStore, preview: PreviewId) -> bool {
        let before = self.gallery.len();
        self.gallery.retain(|upload| upload.preview != preview);
        let removed = self.gallery.len() != before;
        if removed {
            previews.release(preview);
        }
        removed
    }

    /// Marks a persisted gallery path for deletion on save. Returns `false` if already marked.
    pub fn mark_removed(&mut self, path: &str) -> bool {
        self.removals.insert(path.to_string())
    }

    /// Discards everything, releasing every preview.
    pub fn clear(&mut self, previews: &mut PreviewStore) {
        if let Some(thumbnail) = self.thumbnail.take() {
            previews.release(thumbnail.preview);
        }
        for upload in self.gallery.drain(..) {
            previews.release(upload.preview);
        }
        self.removals.clear();
    }
}

/// Splits `existing` into (survivors, removed), both in their original order.
pub fn partition_gallery(
    existing: &[String],
    removals: &AHashSet<String>,
) -> (Vec<String>, Vec<String>) {
    existing
        .iter()
        .cloned()
        .partition(|path| !removals.contains(path))
}

/// `project-{id}/{prefix}-{token}.{ext}` with a fresh uniqueness token.
pub fn storage_path(project_id: &ProjectId, prefix: &str, file: &LocalFile) -> String {
    format!(
        "project-{project_id}/{prefix}-{token}.{ext}",
        token = Uuid::new_v4().simple(),
        ext = file.extension()
    )
}
