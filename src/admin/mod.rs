//! Admin dashboard: the per-session controller, its typed forms and the rendered view.

mod controller;
mod form;
mod render;
mod view;

pub use controller::{AdminController, ListStatus, Notice};
pub use form::{DeleteForm, LoginForm, ProjectForm};
pub use render::{render_admin, render_delete_confirm};
pub use view::{AdminView, DashboardView, EditorView, GalleryTile, ListItem, ListView, ThumbnailView};

pub const NEW_PROJECT: &str = "New project";
pub const UNTITLED: &str = "Untitled";
pub const UNTITLED_LIST_ITEM: &str = "Untitled project";
pub const DRAFT: &str = "Draft";
pub const FEATURED: &str = "Featured";
pub const NONE_SELECTED: &str = "None selected";
pub const NO_GALLERY_IMAGES: &str = "No gallery images";
pub const NO_PROJECTS: &str = "No projects yet. Add your first one!";
pub const FETCHING_PROJECTS: &str = "Fetching projects…";
pub const LOAD_FAILED: &str = "Failed to load projects.";
pub const PROJECT_CREATED: &str = "Project created.";
pub const PROJECT_SAVED: &str = "Project saved.";
pub const DELETE_FAILED: &str = "Failed to delete.";
pub const DELETE_CONFIRMATION: &str = "Delete this project? This cannot be undone.";
