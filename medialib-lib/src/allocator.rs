//! Unique id issue and physical path derivation.
//!
//! Physical files live at `<root>/<KindDir>/<id / bucket_size>/<id>.<ext>`.
//! The path is a pure function of the id, kind and extension, so it never
//! depends on the asset's logical name.

use std::path::{Path, PathBuf};

use medialib_core::{MediaKind, MediaLibError};
use medialib_db::IndexStore;

pub const DEFAULT_BUCKET_SIZE: i64 = 1000;

#[derive(Debug, Clone)]
pub struct PathAllocator {
    root: PathBuf,
    bucket_size: i64,
}

impl PathAllocator {
    pub fn new(root: impl Into<PathBuf>, bucket_size: i64) -> Self {
        Self {
            root: root.into(),
            bucket_size: bucket_size.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bucket_size(&self) -> i64 {
        self.bucket_size
    }

    /// Issue the next id for `kind`. The number is consumed even if the
    /// caller's create later fails.
    pub fn next_id(&self, store: &IndexStore, kind: MediaKind) -> Result<i64, MediaLibError> {
        let id = store.next_unique_number(kind)?;
        log::debug!("Issued {} id {}", kind.key(), id);
        Ok(id)
    }

    /// Top-level directory holding every bucket of `kind`.
    pub fn kind_root(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn bucket_dir(&self, id: i64, kind: MediaKind) -> PathBuf {
        self.kind_root(kind).join((id / self.bucket_size).to_string())
    }

    pub fn derive_path(&self, id: i64, kind: MediaKind, extension: &str) -> PathBuf {
        self.bucket_dir(id, kind)
            .join(format!("{}.{}", id, extension.to_ascii_lowercase()))
    }

    /// Recover `(kind, id, extension)` from a derived path.
    ///
    /// Returns `None` for paths this allocator could not have produced.
    pub fn parse_path(&self, path: &Path) -> Option<(MediaKind, i64, String)> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = rel.iter().map(|p| p.to_str());
        let kind_dir = parts.next()??;
        let bucket: i64 = parts.next()??.parse().ok()?;
        let file = parts.next()??;
        if parts.next().is_some() {
            return None;
        }
        let kind = MediaKind::all()
            .iter()
            .copied()
            .find(|k| k.dir_name() == kind_dir)?;
        let (id, ext) = file.split_once('.')?;
        let id: i64 = id.parse().ok()?;
        if id / self.bucket_size != bucket || ext.is_empty() {
            return None;
        }
        Some((kind, id, ext.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_bucketed_by_id() {
        let alloc = PathAllocator::new("/lib", 1000);
        assert_eq!(
            alloc.derive_path(7, MediaKind::Audio, "MP3"),
            PathBuf::from("/lib/Audio/0/7.mp3")
        );
        assert_eq!(
            alloc.derive_path(1000, MediaKind::Image, "jpg"),
            PathBuf::from("/lib/Image/1/1000.jpg")
        );
        assert_eq!(
            alloc.derive_path(123_456, MediaKind::File, "txt"),
            PathBuf::from("/lib/File/123/123456.txt")
        );
    }

    #[test]
    fn derived_paths_parse_back() {
        let alloc = PathAllocator::new("/lib", 10);
        for (id, kind, ext) in [
            (1, MediaKind::Video, "mp4"),
            (99, MediaKind::Audio, "flac"),
            (10, MediaKind::File, "tar"),
        ] {
            let path = alloc.derive_path(id, kind, ext);
            assert_eq!(alloc.parse_path(&path), Some((kind, id, ext.to_string())));
        }
        assert_eq!(alloc.parse_path(Path::new("/lib/Audio/3/7.mp3")), None);
        assert_eq!(alloc.parse_path(Path::new("/elsewhere/Audio/0/7.mp3")), None);
    }

    #[test]
    fn zero_bucket_size_is_clamped() {
        let alloc = PathAllocator::new("/lib", 0);
        assert_eq!(alloc.bucket_size(), 1);
    }

    #[test]
    fn next_id_uses_store_sequence() {
        let store = IndexStore::open_memory().unwrap();
        let alloc = PathAllocator::new("/lib", 1000);
        assert_eq!(alloc.next_id(&store, MediaKind::Audio).unwrap(), 1);
        assert_eq!(alloc.next_id(&store, MediaKind::Audio).unwrap(), 2);
    }
}
