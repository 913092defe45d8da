//! Consistency repair: find index rows whose files are gone and pending
//! assets that were never finished, then remove them.
//!
//! Planning only reads. Execution holds one transaction, re-checks each
//! planned row against the index and the filesystem, and only then removes
//! its file and row.

use std::path::{Path, PathBuf};

use medialib_core::{FileAsset, MediaLibError, MediaUri, OperationObject};
use medialib_db::{operations, queries};

use crate::context::{LibraryContext, commit, rollback_logged};
use crate::fs_ops;

/// Why a row is scheduled for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairReason {
    /// Finished asset whose file no longer exists.
    MissingFile,
    /// Pending past the garbage timeout with no content.
    StalePending,
}

impl RepairReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingFile => "file missing",
            Self::StalePending => "stale pending asset",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepairAction {
    pub uri: MediaUri,
    pub display_name: String,
    pub data: PathBuf,
    pub reason: RepairReason,
}

#[derive(Debug)]
pub struct RepairPlan {
    /// Rows checked and found consistent.
    pub consistent: usize,
    pub actions: Vec<RepairAction>,
    /// Options the plan was made with; execution re-checks against them.
    pub options: RepairOptions,
}

impl RepairPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn count(&self, reason: RepairReason) -> usize {
        self.actions.iter().filter(|a| a.reason == reason).count()
    }
}

#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Evaluation time, epoch milliseconds.
    pub now: i64,
    /// Pending assets older than this are garbage.
    pub garbage_timeout_millis: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    pub rows_removed: usize,
    pub files_removed: usize,
    /// Planned rows that no longer qualified at execution time.
    pub skipped: Vec<MediaUri>,
    pub errors: Vec<String>,
}

fn classify(asset: &FileAsset, options: &RepairOptions) -> Option<RepairReason> {
    let data = Path::new(&asset.data);
    let size = std::fs::metadata(data).ok().map(|m| m.len());
    if asset.is_pending() {
        let age = options.now.saturating_sub(asset.time_pending);
        let empty = size.is_none_or(|s| s == 0);
        (age > options.garbage_timeout_millis && empty).then_some(RepairReason::StalePending)
    } else {
        size.is_none().then_some(RepairReason::MissingFile)
    }
}

/// Scan every asset table and plan removals.
pub fn plan_repair(ctx: &LibraryContext, options: &RepairOptions) -> Result<RepairPlan, MediaLibError> {
    let mut plan = RepairPlan {
        consistent: 0,
        actions: Vec::new(),
        options: options.clone(),
    };
    for &object in OperationObject::asset_objects() {
        let assets = {
            let conn = ctx.store.lock();
            queries::query_assets(&conn, object, None, &[])?
        };
        for asset in assets {
            match classify(&asset, options) {
                Some(reason) => {
                    log::debug!("{} {}: {}", object, asset.file_id, reason.description());
                    plan.actions.push(RepairAction {
                        uri: MediaUri::new(object, asset.file_id),
                        display_name: asset.display_name,
                        data: PathBuf::from(asset.data),
                        reason,
                    });
                }
                None => plan.consistent += 1,
            }
        }
    }
    Ok(plan)
}

/// Carry out a plan. Each row is re-read under the store lock and must
/// still qualify; rows that changed since planning are skipped. Files that
/// fail to delete keep their rows.
pub fn execute_repair(ctx: &LibraryContext, plan: &RepairPlan) -> Result<RepairSummary, MediaLibError> {
    let mut summary = RepairSummary::default();
    let mut removed = Vec::with_capacity(plan.actions.len());

    let mut tx = ctx.store.transaction()?;
    for action in &plan.actions {
        let uri = action.uri;
        let current = match queries::get_asset(&tx, uri.object, uri.id) {
            Ok(current) => current,
            Err(e) => {
                rollback_logged(&mut tx);
                return Err(e.into());
            }
        };
        let Some((asset, reason)) =
            current.and_then(|asset| classify(&asset, &plan.options).map(|reason| (asset, reason)))
        else {
            log::debug!("{}: no longer needs repair, skipping", uri);
            summary.skipped.push(uri);
            continue;
        };

        let data = PathBuf::from(&asset.data);
        if reason == RepairReason::StalePending && data.exists() {
            match fs_ops::delete_file(&data) {
                Ok(()) => summary.files_removed += 1,
                Err(e) => {
                    summary.errors.push(format!("{}: {}", uri, e));
                    continue;
                }
            }
        }
        if let Err(e) = operations::delete_asset(&tx, uri.object, uri.id) {
            rollback_logged(&mut tx);
            return Err(e.into());
        }
        removed.push(uri);
    }
    commit(tx)?;
    summary.rows_removed = removed.len();

    for uri in removed {
        ctx.tracker.remove_all(uri);
        ctx.invalidate_thumbnail(&uri);
    }

    log::info!(
        "Repair removed {} row(s) and {} file(s), skipped {}",
        summary.rows_removed,
        summary.files_removed,
        summary.skipped.len()
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/repair_tests.rs"]
mod tests;
