//! Public gallery: featured and all-projects mounts rendered as project cards.

mod card;
mod render;

pub use card::{ProjectCard, card_images};
pub use render::{GalleryPage, GalleryRenderer};

use folio_schema::ProjectRow;

/// Featured mount shows at most this many projects.
pub const FEATURED_LIMIT: usize = 3;

/// Image rotation interval used when a project sets none.
pub const DEFAULT_GALLERY_INTERVAL_MS: u64 = 4500;

pub const UNTITLED_PROJECT: &str = "Untitled Project";
pub const NO_PREVIEW: &str = "No preview available";
pub const NO_PROJECTS: &str = "No projects yet.";
pub const LOAD_FAILED: &str = "Unable to load projects right now.";

/// A place on the public page that lists projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mount {
    Featured,
    All,
}

impl Mount {
    pub fn as_str(self) -> &'static str {
        match self {
            Mount::Featured => "featured",
            Mount::All => "all",
        }
    }
}

/// Emitted once per rendered mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent {
    /// Cards are in place; image rotation and dragging can attach.
    GalleriesReady(Mount),
    ProjectsRendered(Mount),
}

/// Rendered content of one mount.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Cards(Vec<ProjectCard>),
    Empty(&'static str),
}

/// Featured projects in fetched order, capped at [`FEATURED_LIMIT`].
pub fn select_featured(rows: &[ProjectRow]) -> Vec<&ProjectRow> {
    rows.iter()
        .filter(|row| row.is_featured)
        .take(FEATURED_LIMIT)
        .collect()
}
