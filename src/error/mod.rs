mod folio;

pub use folio::{ErrorKind, FolioError};
