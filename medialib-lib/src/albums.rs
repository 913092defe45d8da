//! Logical albums: named relative-path groupings of legacy assets.
//!
//! Albums own no directories. Renaming one rewrites the relative paths of
//! the assets below it.

use medialib_core::media_type::allowed_types_for_root;
use medialib_core::validate::{normalize_relative_path, root_of, validate_album_name};
use medialib_core::{Album, MediaLibError, OperationObject, columns};
use medialib_db::{operations, queries};

use crate::collab::{ChangeEvent, ChangeKind};
use crate::command::MediaLibraryCommand;
use crate::context::{LibraryContext, commit};
use crate::util::{now_millis, parent_relative_path};

/// Parent used when a create names none.
pub const DEFAULT_ALBUM_PARENT: &str = "Pictures/";

fn require_album(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<Album, MediaLibError> {
    let album_id = cmd.require_file_id()?;
    let conn = ctx.store.lock();
    queries::get_album(&conn, album_id)?
        .ok_or_else(|| MediaLibError::InvalidFileId(format!("album {album_id}")))
}

fn ensure_path_free(ctx: &LibraryContext, relative_path: &str, name: &str) -> Result<(), MediaLibError> {
    let conn = ctx.store.lock();
    if queries::find_album_by_path(&conn, relative_path)?.is_some() {
        return Err(MediaLibError::NameConflict {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
        });
    }
    Ok(())
}

/// Create an album below a known root. Returns the new `album_id`.
pub fn create_album(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let name = cmd.values.require_str(columns::ALBUM_NAME)?;
    validate_album_name(name)?;
    let parent = match cmd.values.get(columns::RELATIVE_PATH) {
        Some(_) => normalize_relative_path(cmd.values.require_str(columns::RELATIVE_PATH)?)?,
        None => DEFAULT_ALBUM_PARENT.to_string(),
    };
    if allowed_types_for_root(root_of(&parent)).is_none() {
        return Err(MediaLibError::invalid_path(format!(
            "'{parent}' is not under a known root"
        )));
    }
    let relative_path = format!("{parent}{name}/");
    ensure_path_free(ctx, &relative_path, name)?;

    let tx = ctx.store.transaction()?;
    let album_id = operations::insert_album(&tx, name, &relative_path, now_millis())?;
    commit(tx)?;

    log::debug!("Created album {} at {}", album_id, relative_path);
    ctx.notify(ChangeEvent::new(ChangeKind::Added, OperationObject::Album, album_id));
    Ok(album_id)
}

/// Rename an album and move every asset and nested album below it.
/// Returns rows changed.
pub fn rename_album(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let album = require_album(ctx, cmd)?;
    let name = cmd.values.require_str(columns::ALBUM_NAME)?;
    validate_album_name(name)?;
    if name == album.album_name {
        return Ok(0);
    }

    let parent = parent_relative_path(&album.relative_path).unwrap_or_default();
    let new_path = format!("{parent}{name}/");
    ensure_path_free(ctx, &new_path, name)?;

    let tx = ctx.store.transaction()?;
    for object in OperationObject::asset_objects() {
        if let Some((file_id, relative_path)) = queries::find_prefix_move_conflict(
            &tx,
            *object,
            &album.relative_path,
            &new_path,
        )? {
            log::debug!("{} {} would collide under {}", object, file_id, relative_path);
            let asset = queries::get_asset(&tx, *object, file_id)?;
            return Err(MediaLibError::NameConflict {
                name: asset.map(|a| a.display_name).unwrap_or_default(),
                relative_path,
            });
        }
    }

    let now = now_millis();
    operations::rename_album(&tx, album.album_id, name, &new_path, now)?;
    let nested = operations::rewrite_album_path_prefix(&tx, &album.relative_path, &new_path, now)?;
    let mut moved = 0;
    for object in OperationObject::asset_objects() {
        moved += operations::rewrite_relative_path_prefix(
            &tx,
            *object,
            &album.relative_path,
            &new_path,
        )?;
    }
    commit(tx)?;

    log::debug!(
        "Renamed album {} to {} ({} asset(s), {} nested album(s) moved)",
        album.album_id,
        new_path,
        moved,
        nested
    );
    ctx.notify(ChangeEvent::new(ChangeKind::Updated, OperationObject::Album, album.album_id));
    Ok((1 + nested + moved) as i64)
}

/// Delete an album. Refused while live assets remain below it.
pub fn delete_album(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let album = require_album(ctx, cmd)?;

    let tx = ctx.store.transaction()?;
    let live = queries::count_live_assets_under(&tx, &album.relative_path)?;
    if live > 0 {
        return Err(MediaLibError::invalid_values(format!(
            "album '{}' still holds {} asset(s)",
            album.album_name, live
        )));
    }
    operations::delete_album(&tx, album.album_id)?;
    commit(tx)?;

    ctx.notify(ChangeEvent::new(ChangeKind::Removed, OperationObject::Album, album.album_id));
    Ok(1)
}

pub fn list_albums(ctx: &LibraryContext) -> Result<Vec<Album>, MediaLibError> {
    let conn = ctx.store.lock();
    Ok(queries::list_albums(&conn)?)
}
