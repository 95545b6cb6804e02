use crate::media::LocalFile;
use ahash::AHashMap;
use std::{fmt, str::FromStr};

/// Handle to a local preview of a not-yet-uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PreviewId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(PreviewId)
    }
}

/// Live previews of one editor session.
///
/// A preview stays addressable until it is released; every superseded or discarded pending
/// file must be released or it is held for the lifetime of the session.
#[derive(Debug, Default)]
pub struct PreviewStore {
    next_id: u64,
    live: AHashMap<PreviewId, LocalFile>,
}

impl PreviewStore {
    pub fn create(&mut self, file: &LocalFile) -> PreviewId {
        self.next_id += 1;
        let id = PreviewId(self.next_id);
        self.live.insert(id, file.clone());
        id
    }

    /// Returns `false` if the preview was already released.
    pub fn release(&mut self, id: PreviewId) -> bool {
        self.live.remove(&id).is_some()
    }

    pub fn get(&self, id: PreviewId) -> Option<&LocalFile> {
        self.live.get(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previews_are_unique_and_released_once() {
        let mut store = PreviewStore::default();
        let file = LocalFile::new("a.png", None, "png-bytes");

        let a = store.create(&file);
        let b = store.create(&file);
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.get(a).map(LocalFile::name), Some("a.png"));

        assert!(store.release(a));
        assert!(!store.release(a));
        assert!(store.get(a).is_none());
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn preview_id_round_trips_through_text() {
        let mut store = PreviewStore::default();
        let id = store.create(&LocalFile::new("a.png", None, "x"));
        assert_eq!(id.to_string().parse::<PreviewId>(), Ok(id));
        assert!("abc".parse::<PreviewId>().is_err());
    }
}
