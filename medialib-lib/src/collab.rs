//! Collaborators the lifecycle engine calls out to: thumbnail invalidation,
//! change notification and permission checks.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use medialib_core::{MediaUri, OperationObject};

// ── Thumbnails ──────────────────────────────────────────────────────────────

/// Drops derived thumbnails of an asset. Fire-and-forget.
pub trait ThumbnailInvalidator: Send + Sync {
    fn invalidate_thumbnail(&self, uri: &MediaUri);
}

/// Thumbnail cache laid out as `<dir>/<Object>/<id>/`.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn asset_dir(&self, uri: &MediaUri) -> PathBuf {
        self.dir
            .join(uri.object.uri_segment())
            .join(uri.id.to_string())
    }
}

impl ThumbnailInvalidator for ThumbnailCache {
    fn invalidate_thumbnail(&self, uri: &MediaUri) {
        let dir = self.asset_dir(uri);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => log::debug!("Removed thumbnails for {}", uri),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove thumbnails for {}: {}", uri, e),
        }
    }
}

pub struct NoThumbnails;

impl ThumbnailInvalidator for NoThumbnails {
    fn invalidate_thumbnail(&self, _uri: &MediaUri) {}
}

// ── Change notification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
    Trashed,
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub uri: MediaUri,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, object: OperationObject, id: i64) -> Self {
        Self {
            kind,
            uri: MediaUri::new(object, id),
        }
    }
}

/// Receives an event after each successful commit.
pub trait ChangeNotifier: Send + Sync {
    fn notify_change(&self, event: ChangeEvent);
}

impl ChangeNotifier for Sender<ChangeEvent> {
    fn notify_change(&self, event: ChangeEvent) {
        // A dropped receiver just means nobody is listening.
        let _ = self.send(event);
    }
}

pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify_change(&self, _event: ChangeEvent) {}
}

// ── Permissions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ReadImageVideo,
    WriteImageVideo,
    ReadAudio,
    WriteAudio,
    ReadFiles,
    WriteFiles,
}

impl Permission {
    /// Permission needed to read (`write == false`) or change an object.
    pub fn for_object(object: OperationObject, write: bool) -> Self {
        match (object, write) {
            (OperationObject::Photo | OperationObject::Album, false) => Self::ReadImageVideo,
            (OperationObject::Photo | OperationObject::Album, true) => Self::WriteImageVideo,
            (OperationObject::Audio, false) => Self::ReadAudio,
            (OperationObject::Audio, true) => Self::WriteAudio,
            (OperationObject::File, false) => Self::ReadFiles,
            (OperationObject::File, true) => Self::WriteFiles,
        }
    }
}

pub trait PermissionChecker: Send + Sync {
    fn check(&self, permission: Permission) -> bool;
}

/// Grants only the listed permissions.
pub struct StaticPermissions(pub Vec<Permission>);

impl PermissionChecker for StaticPermissions {
    fn check(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }
}

/// The set of collaborators a service is built with.
#[derive(Clone)]
pub struct Collaborators {
    pub thumbnails: Arc<dyn ThumbnailInvalidator>,
    pub notifier: Arc<dyn ChangeNotifier>,
    pub permissions: Option<Arc<dyn PermissionChecker>>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            thumbnails: Arc::new(NoThumbnails),
            notifier: Arc::new(NoopNotifier),
            permissions: None,
        }
    }
}

impl Collaborators {
    pub fn with_thumbnails(mut self, thumbnails: impl ThumbnailInvalidator + 'static) -> Self {
        self.thumbnails = Arc::new(thumbnails);
        self
    }

    pub fn with_notifier(mut self, notifier: impl ChangeNotifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_permissions(mut self, permissions: impl PermissionChecker + 'static) -> Self {
        self.permissions = Some(Arc::new(permissions));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn thumbnail_cache_removes_asset_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(dir.path());
        let uri = MediaUri::new(OperationObject::Photo, 3);
        let thumbs = cache.asset_dir(&uri);
        std::fs::create_dir_all(&thumbs).unwrap();
        std::fs::write(thumbs.join("lcd.jpg"), b"x").unwrap();

        cache.invalidate_thumbnail(&uri);
        assert!(!thumbs.exists());
        // Second call on a missing dir is silent
        cache.invalidate_thumbnail(&uri);
    }

    #[test]
    fn sender_notifier_delivers_and_tolerates_closed_channel() {
        let (tx, rx) = mpsc::channel();
        tx.notify_change(ChangeEvent::new(ChangeKind::Added, OperationObject::Audio, 1));
        assert_eq!(rx.recv().unwrap().kind, ChangeKind::Added);
        drop(rx);
        tx.notify_change(ChangeEvent::new(ChangeKind::Removed, OperationObject::Audio, 1));
    }

    #[test]
    fn permission_mapping() {
        assert_eq!(
            Permission::for_object(OperationObject::Album, true),
            Permission::WriteImageVideo
        );
        let checker = StaticPermissions(vec![Permission::ReadAudio]);
        assert!(checker.check(Permission::for_object(OperationObject::Audio, false)));
        assert!(!checker.check(Permission::for_object(OperationObject::Audio, true)));
    }
}
