//! Local files, their previews, and the pending-media bookkeeping of an open editor.
//!
//! Nothing in here talks to the backend: files chosen in the editor stay local until the
//! editor is saved, and removals of persisted images are only recorded.

mod file;
mod pending;
mod preview;

pub use file::LocalFile;
pub use pending::{PendingMedia, PendingUpload, partition_gallery, storage_path};
pub use preview::{PreviewId, PreviewStore};

/// Hard cap on `gallery_urls`.
pub const MAX_GALLERY_IMAGES: usize = 10;

/// True for `http:`/`https:` references, which are never storage objects.
pub fn is_absolute_url(path: &str) -> bool {
    let path = path.trim_start();
    ["http:", "https:"].iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Storage object behind a reference, if it is one (non-empty and not an absolute URL).
pub fn storage_object(path: &str) -> Option<&str> {
    let path = path.trim();
    (!path.is_empty() && !is_absolute_url(path)).then_some(path)
}
