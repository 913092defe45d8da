//! The media library service: one explicitly constructed object owning the
//! index, the allocator, open handles and collaborators.
//!
//! Callers may use it from many threads at once; it spawns none itself.

use std::fs::File;

use medialib_core::{
    Album, FileAsset, MediaKind, MediaLibError, OperationObject, to_result_code,
};
use medialib_db::IndexStore;

use crate::albums;
use crate::allocator::PathAllocator;
use crate::asset_ops;
use crate::collab::{Collaborators, Permission};
use crate::command::{MODE_KEY, MediaLibraryCommand, OperationType};
use crate::context::LibraryContext;
use crate::fs_ops;
use crate::repair::{self, RepairOptions, RepairPlan, RepairSummary};
use crate::settings::Settings;
use crate::util::now_millis;

pub struct MediaLibraryService {
    ctx: LibraryContext,
    garbage_timeout_millis: i64,
}

impl MediaLibraryService {
    /// Open the library described by `settings`, creating the root, the
    /// per-kind directories and the index as needed.
    pub fn init(settings: &Settings, collaborators: Collaborators) -> Result<Self, MediaLibError> {
        let root = settings.root();
        let allocator = PathAllocator::new(&root, settings.allocator.bucket_size);
        for kind in MediaKind::all() {
            fs_ops::ensure_directory(&allocator.kind_root(*kind))?;
        }
        let database = settings.database_path();
        if let Some(parent) = database.parent() {
            fs_ops::ensure_directory(parent)?;
        }
        let store = IndexStore::open(&database)?;
        log::info!("Media library at {}", root.display());

        let mut service = Self::from_parts(store, allocator, collaborators);
        service.garbage_timeout_millis = settings.garbage_timeout_millis();
        Ok(service)
    }

    /// Assemble a service from an already opened store.
    pub fn from_parts(
        store: IndexStore,
        allocator: PathAllocator,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            ctx: LibraryContext::new(store, allocator, collaborators),
            garbage_timeout_millis: Settings::default().garbage_timeout_millis(),
        }
    }

    pub fn context(&self) -> &LibraryContext {
        &self.ctx
    }

    pub fn store(&self) -> &IndexStore {
        &self.ctx.store
    }

    pub fn allocator(&self) -> &PathAllocator {
        &self.ctx.allocator
    }

    fn check_permission(&self, cmd: &MediaLibraryCommand) -> Result<(), MediaLibError> {
        let Some(checker) = &self.ctx.collaborators.permissions else {
            return Ok(());
        };
        let permission = Permission::for_object(cmd.object, cmd.operation.is_write());
        if checker.check(permission) {
            Ok(())
        } else {
            Err(MediaLibError::PermissionDenied(format!("{permission:?}")))
        }
    }

    /// Run a command and return its typed result: the new id for creates,
    /// the descriptor for opens, a row count otherwise.
    pub fn execute(&self, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
        self.check_permission(cmd)?;
        let ctx = &self.ctx;
        match (cmd.object, cmd.operation) {
            (OperationObject::Album, OperationType::Create) => albums::create_album(ctx, cmd),
            (OperationObject::Album, OperationType::Update) => albums::rename_album(ctx, cmd),
            (OperationObject::Album, OperationType::Delete) => albums::delete_album(ctx, cmd),
            (OperationObject::Album, OperationType::Query) => {
                Ok(albums::list_albums(ctx)?.len() as i64)
            }
            (OperationObject::Album, op) => Err(MediaLibError::invalid_values(format!(
                "{op:?} does not apply to albums"
            ))),
            (_, OperationType::Create) => asset_ops::create_asset(ctx, cmd),
            (_, OperationType::Delete) => asset_ops::delete_asset(ctx, cmd),
            (_, OperationType::Update) => asset_ops::update_asset(ctx, cmd),
            (_, OperationType::Trash) => asset_ops::set_trashed(ctx, cmd, true),
            (_, OperationType::Recover) => asset_ops::set_trashed(ctx, cmd, false),
            (_, OperationType::Close) => asset_ops::close_asset(ctx, cmd),
            (_, OperationType::Open) => {
                let mode = cmd.values.get_str(MODE_KEY).unwrap_or_default();
                asset_ops::open_asset(ctx, cmd, mode).map(i64::from)
            }
            (_, OperationType::Query) => Ok(asset_ops::query_assets(ctx, cmd)?.len() as i64),
        }
    }

    /// Signed entry point: non-negative results, negative error codes.
    pub fn handle(&self, cmd: &MediaLibraryCommand) -> i32 {
        let result = self.execute(cmd);
        if let Err(e) = &result {
            log::warn!("{:?} on {} failed: {}", cmd.operation, cmd.object, e);
        }
        to_result_code(result)
    }

    /// Open an asset. Returns a descriptor or a negative error code.
    pub fn open(&self, cmd: &MediaLibraryCommand, mode: &str) -> i32 {
        let result = self
            .check_permission(cmd)
            .and_then(|()| asset_ops::open_asset(&self.ctx, cmd, mode));
        if let Err(e) = &result {
            log::warn!("Open of {} failed: {}", cmd.object, e);
        }
        to_result_code(result)
    }

    /// Hand out the file behind a descriptor. Each descriptor's file can be
    /// taken once; the descriptor stays registered until closed.
    pub fn take_file(&self, fd: i32) -> Option<File> {
        self.ctx.tracker.take_file(fd)
    }

    pub fn query(&self, cmd: &MediaLibraryCommand) -> Result<Vec<FileAsset>, MediaLibError> {
        self.check_permission(cmd)?;
        asset_ops::query_assets(&self.ctx, cmd)
    }

    pub fn query_albums(&self) -> Result<Vec<Album>, MediaLibError> {
        albums::list_albums(&self.ctx)
    }

    pub fn plan_repair(&self) -> Result<RepairPlan, MediaLibError> {
        repair::plan_repair(
            &self.ctx,
            &RepairOptions {
                now: now_millis(),
                garbage_timeout_millis: self.garbage_timeout_millis,
            },
        )
    }

    pub fn execute_repair(&self, plan: &RepairPlan) -> Result<RepairSummary, MediaLibError> {
        repair::execute_repair(&self.ctx, plan)
    }

    /// Release every open handle. Returns how many were open.
    pub fn shutdown(&self) -> usize {
        let closed = self.ctx.tracker.clear();
        if closed > 0 {
            log::info!("Closed {} open handle(s) at shutdown", closed);
        }
        closed
    }
}

impl Drop for MediaLibraryService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
