//! Media library engine: keeps a filesystem tree of media files and its
//! SQLite index consistent across create, rename, move and delete.
//!
//! [`MediaLibraryService`] is the entry point. Commands are validated, given
//! ids and paths by the allocator, applied to disk and committed to the index
//! in one transaction, with compensation when a step fails.

pub mod albums;
pub mod allocator;
pub mod asset_ops;
pub mod collab;
pub mod command;
pub mod context;
pub mod fs_ops;
pub mod open_status;
pub mod repair;
pub mod service;
pub mod settings;
pub mod util;

pub use allocator::PathAllocator;
pub use collab::{
    ChangeEvent, ChangeKind, ChangeNotifier, Collaborators, NoopNotifier, Permission,
    PermissionChecker, ThumbnailCache, ThumbnailInvalidator,
};
pub use command::{MediaLibraryCommand, OperationType, Predicates};
pub use context::LibraryContext;
pub use open_status::{OpenHandleTracker, OpenMode, OpenStatus};
pub use repair::{RepairPlan, RepairReason, RepairSummary};
pub use service::MediaLibraryService;
pub use settings::{Settings, SettingsError};
