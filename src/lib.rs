pub mod admin;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gateway;
pub mod html;
pub mod media;
pub mod server;
pub(crate) mod utils;

pub use error::FolioError;
