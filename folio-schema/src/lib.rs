pub mod auth;
pub mod project;
pub mod rest;
pub mod storage;

pub use auth::{AuthErrorBody, AuthUser, PasswordGrant, RefreshGrant, TokenResponse};
pub use project::{ProjectFields, ProjectId, ProjectInsert, ProjectPatch, ProjectRow, non_empty};
pub use rest::PostgrestErrorBody;
pub use storage::{RemoveObjectsBody, StorageErrorBody};
