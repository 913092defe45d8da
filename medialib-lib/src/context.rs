//! Shared state every lifecycle operation runs against.

use medialib_core::{MediaLibError, MediaUri};
use medialib_db::{IndexStore, TransactionGuard};

use crate::allocator::PathAllocator;
use crate::collab::{ChangeEvent, Collaborators};
use crate::open_status::OpenHandleTracker;

/// The index store, the allocator, open handles and collaborators.
///
/// Built once by the service and borrowed by each operation.
pub struct LibraryContext {
    pub store: IndexStore,
    pub allocator: PathAllocator,
    pub tracker: OpenHandleTracker,
    pub collaborators: Collaborators,
}

impl LibraryContext {
    pub fn new(store: IndexStore, allocator: PathAllocator, collaborators: Collaborators) -> Self {
        Self {
            store,
            allocator,
            tracker: OpenHandleTracker::new(),
            collaborators,
        }
    }

    pub fn notify(&self, event: ChangeEvent) {
        log::debug!("{:?} {}", event.kind, event.uri);
        self.collaborators.notifier.notify_change(event);
    }

    pub fn invalidate_thumbnail(&self, uri: &MediaUri) {
        self.collaborators.thumbnails.invalidate_thumbnail(uri);
    }
}

/// Roll back `tx` and log a failure instead of returning it, so the error
/// that caused the rollback is the one reported.
pub(crate) fn rollback_logged(tx: &mut TransactionGuard<'_>) {
    if let Err(e) = tx.rollback() {
        log::warn!("Rollback failed: {}", e);
    }
}

/// Commit `tx`, mapping the failure into the library error.
pub(crate) fn commit(tx: TransactionGuard<'_>) -> Result<(), MediaLibError> {
    tx.commit().map_err(Into::into)
}
