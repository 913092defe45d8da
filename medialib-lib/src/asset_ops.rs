//! Asset lifecycle: create, delete, update/rename, trash, open and close.
//!
//! Each operation validates first, then runs its index changes inside one
//! transaction. Physical changes made before a failed commit are undone.

use std::path::{Path, PathBuf};

use medialib_core::asset::mime_type_for;
use medialib_core::util::{extension_of, title_of};
use medialib_core::validate::{
    validate_display_name, validate_extension_matches_type, validate_relative_path,
    validate_title,
};
use medialib_core::{
    ApiVersion, FileAsset, MediaKind, MediaLibError, MediaType, MediaUri, OperationObject, Value,
    columns,
};
use medialib_db::{Connection, NewAsset, operations, queries};

use crate::collab::{ChangeEvent, ChangeKind};
use crate::command::{FD_KEY, MediaLibraryCommand};
use crate::context::{LibraryContext, commit, rollback_logged};
use crate::fs_ops;
use crate::open_status::{OpenMode, OpenStatus};
use crate::util::now_millis;

/// Columns that may change together in a rename/move.
const RENAME_COLUMNS: &[&str] = &[
    columns::DISPLAY_NAME,
    columns::TITLE,
    columns::RELATIVE_PATH,
];

/// Flags that may only change on their own.
const FLAG_COLUMNS: &[&str] = &[columns::IS_FAVORITE, columns::HIDDEN];

pub(crate) fn lookup(
    ctx: &LibraryContext,
    object: OperationObject,
    file_id: i64,
) -> Result<Option<FileAsset>, MediaLibError> {
    let conn = ctx.store.lock();
    Ok(queries::get_asset(&conn, object, file_id)?)
}

fn require_asset(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<FileAsset, MediaLibError> {
    let file_id = cmd.require_file_id()?;
    lookup(ctx, cmd.object, file_id)?
        .ok_or_else(|| MediaLibError::InvalidFileId(format!("{} {}", cmd.object, file_id)))
}

fn kind_of(media_type: MediaType) -> Result<MediaKind, MediaLibError> {
    media_type
        .kind()
        .ok_or_else(|| MediaLibError::invalid_values(format!("{media_type} has no files")))
}

/// Media type of a new asset: explicit value, else inferred from the table
/// and the extension.
fn resolve_media_type(cmd: &MediaLibraryCommand, name: &str) -> Result<MediaType, MediaLibError> {
    if cmd.values.contains(columns::MEDIA_TYPE) {
        let raw = cmd.values.require_i32(columns::MEDIA_TYPE)?;
        let media_type = MediaType::from_i32(raw).ok_or_else(|| {
            MediaLibError::invalid_values(format!("unknown media type {raw}"))
        })?;
        if !cmd.object.accepts(media_type) {
            return Err(MediaLibError::invalid_values(format!(
                "{media_type} assets do not belong in {}",
                cmd.object.table()
            )));
        }
        return Ok(media_type);
    }
    Ok(match cmd.object {
        OperationObject::Audio => MediaType::Audio,
        OperationObject::File => MediaType::File,
        OperationObject::Photo => match extension_of(name).map(|e| MediaType::from_extension(&e)) {
            Some(MediaType::Video) => MediaType::Video,
            _ => MediaType::Image,
        },
        OperationObject::Album => {
            return Err(MediaLibError::invalid_values("albums are not assets"));
        }
    })
}

fn virtual_path(api: ApiVersion, relative_path: &str, name: &str) -> String {
    match api {
        ApiVersion::Legacy => format!("{relative_path}{name}"),
        ApiVersion::Unified => String::new(),
    }
}

fn ensure_no_conflict(
    conn: &Connection,
    object: OperationObject,
    relative_path: &str,
    name: &str,
    exclude: Option<i64>,
) -> Result<(), MediaLibError> {
    if let Some(other) =
        queries::find_legacy_name_conflict(conn, object, relative_path, name, exclude)?
    {
        log::debug!("'{}{}' already used by {} {}", relative_path, name, object, other);
        return Err(MediaLibError::NameConflict {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
        });
    }
    Ok(())
}

// ── Create ──────────────────────────────────────────────────────────────────

/// Create a pending asset with an empty file. Returns the new `file_id`.
pub fn create_asset(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let name = cmd.values.require_str(columns::DISPLAY_NAME)?;
    validate_display_name(name)?;
    let media_type = resolve_media_type(cmd, name)?;
    validate_extension_matches_type(name, media_type)?;

    let relative_path = match cmd.api {
        ApiVersion::Legacy => {
            let requested = match cmd.values.get(columns::RELATIVE_PATH) {
                Some(_) => cmd.values.require_str(columns::RELATIVE_PATH)?,
                None => media_type.default_relative_path().unwrap_or_default(),
            };
            validate_relative_path(requested, media_type)?
        }
        ApiVersion::Unified => {
            if cmd.values.contains(columns::RELATIVE_PATH) {
                return Err(MediaLibError::invalid_values(
                    "unified assets cannot choose a relative path",
                ));
            }
            String::new()
        }
    };

    let kind = kind_of(media_type)?;
    let extension = extension_of(name).unwrap_or_default();
    let unique_number = ctx.allocator.next_id(&ctx.store, kind)?;
    let data = ctx.allocator.derive_path(unique_number, kind, &extension);
    let now = now_millis();

    let row = NewAsset {
        data: data.to_string_lossy().into_owned(),
        title: title_of(name).to_string(),
        display_name: name.to_string(),
        media_type,
        mime_type: mime_type_for(&extension).to_string(),
        owner_package: cmd
            .values
            .get_str(columns::OWNER_PACKAGE)
            .unwrap_or_default()
            .to_string(),
        date_added: now,
        time_pending: now,
        virtual_path: virtual_path(cmd.api, &relative_path, name),
        relative_path,
        unique_number,
        api_type: cmd.api,
    };

    let mut tx = ctx.store.transaction()?;
    if cmd.api == ApiVersion::Legacy {
        ensure_no_conflict(&tx, cmd.object, &row.relative_path, name, None)?;
    }

    fs_ops::ensure_directory(&ctx.allocator.bucket_dir(unique_number, kind))?;
    fs_ops::create_empty_file(&data)?;

    let inserted = operations::insert_asset(&tx, cmd.object, &row).map_err(MediaLibError::from);
    let committed = match inserted {
        Ok(file_id) => commit(tx).map(|()| file_id),
        Err(e) => {
            rollback_logged(&mut tx);
            Err(e)
        }
    };
    let file_id = match committed {
        Ok(id) => id,
        Err(e) => {
            discard_created_file(&data);
            return Err(e);
        }
    };

    log::debug!("Created {} {} at {}", cmd.object, file_id, data.display());
    ctx.notify(ChangeEvent::new(ChangeKind::Added, cmd.object, file_id));
    Ok(file_id)
}

fn discard_created_file(data: &Path) {
    if let Err(e) = fs_ops::delete_file(data) {
        log::warn!("Failed to remove {} after aborted create: {}", data.display(), e);
    }
}

// ── Delete ──────────────────────────────────────────────────────────────────

/// Delete an asset's file and row. Returns the number of rows removed.
pub fn delete_asset(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let asset = require_asset(ctx, cmd)?;
    let uri = MediaUri::new(cmd.object, asset.file_id);
    let data = PathBuf::from(&asset.data);

    // Bucket pruning must not interleave with a create filling the same bucket.
    let tx = ctx.store.transaction()?;
    fs_ops::delete_file(&data)?;
    if let (Some(kind), Some(bucket)) = (asset.media_type.kind(), data.parent()) {
        match fs_ops::delete_empty_dirs_upward(bucket, &ctx.allocator.kind_root(kind)) {
            Ok(n) if n > 0 => log::debug!("Pruned {} empty bucket dir(s)", n),
            Ok(_) => {}
            Err(e) => log::warn!("Failed to prune buckets above {}: {}", data.display(), e),
        }
    }
    ctx.tracker.remove_all(uri);
    ctx.invalidate_thumbnail(&uri);

    operations::delete_asset(&tx, cmd.object, asset.file_id)?;
    commit(tx)?;

    ctx.notify(ChangeEvent::new(ChangeKind::Removed, cmd.object, asset.file_id));
    Ok(1)
}

// ── Update / rename / move ──────────────────────────────────────────────────

/// Values being written. A `file_id` entry only selects the target.
fn updated_values(cmd: &MediaLibraryCommand) -> impl Iterator<Item = (&str, &Value)> {
    cmd.values.iter().filter(|(column, _)| *column != columns::FILE_ID)
}

/// Apply an update. Returns the number of rows changed.
pub fn update_asset(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    if updated_values(cmd).next().is_none() {
        return Err(MediaLibError::invalid_values("nothing to update"));
    }
    let asset = require_asset(ctx, cmd)?;

    if updated_values(cmd).any(|(c, _)| FLAG_COLUMNS.contains(&c)) {
        return update_flag(ctx, cmd, &asset);
    }
    if let Some((column, _)) = updated_values(cmd).find(|(c, _)| !RENAME_COLUMNS.contains(c)) {
        return Err(MediaLibError::invalid_values(format!(
            "column '{column}' cannot be updated"
        )));
    }
    if cmd.values.contains(columns::RELATIVE_PATH) && asset.api_type != ApiVersion::Legacy {
        return Err(MediaLibError::invalid_values(
            "only legacy assets have a relative path",
        ));
    }
    rename_asset(ctx, cmd, &asset)
}

fn update_flag(
    ctx: &LibraryContext,
    cmd: &MediaLibraryCommand,
    asset: &FileAsset,
) -> Result<i64, MediaLibError> {
    let mut updated = updated_values(cmd);
    let (column, value) = updated
        .next()
        .ok_or_else(|| MediaLibError::invalid_values("nothing to update"))?;
    if updated.next().is_some() {
        return Err(MediaLibError::invalid_values(
            "favorite and hidden flags must be updated alone",
        ));
    }
    let flag = value
        .as_i64()
        .filter(|v| *v == 0 || *v == 1)
        .ok_or_else(|| MediaLibError::invalid_values(format!("'{column}' must be 0 or 1")))?;

    let tx = ctx.store.transaction()?;
    operations::update_asset_columns(&tx, cmd.object, asset.file_id, &[(column, Value::Int64(flag))])?;
    commit(tx)?;
    ctx.notify(ChangeEvent::new(ChangeKind::Updated, cmd.object, asset.file_id));
    Ok(1)
}

/// New display name from the display name and/or title in `cmd`.
fn renamed_display_name(cmd: &MediaLibraryCommand, asset: &FileAsset) -> Result<String, MediaLibError> {
    let name = match cmd.values.get(columns::DISPLAY_NAME) {
        Some(_) => Some(cmd.values.require_str(columns::DISPLAY_NAME)?),
        None => None,
    };
    let title = match cmd.values.get(columns::TITLE) {
        Some(_) => Some(cmd.values.require_str(columns::TITLE)?),
        None => None,
    };

    match (name, title) {
        (Some(name), Some(title)) => {
            validate_display_name(name)?;
            if title_of(name) != title {
                return Err(MediaLibError::invalid_name(format!(
                    "title '{title}' does not match display name '{name}'"
                )));
            }
            Ok(name.to_string())
        }
        (Some(name), None) => {
            validate_display_name(name)?;
            Ok(name.to_string())
        }
        (None, Some(title)) => {
            let extension = asset.extension().unwrap_or_default();
            validate_title(title, extension)
        }
        (None, None) => Ok(asset.display_name.clone()),
    }
}

fn rename_asset(
    ctx: &LibraryContext,
    cmd: &MediaLibraryCommand,
    asset: &FileAsset,
) -> Result<i64, MediaLibError> {
    let new_name = renamed_display_name(cmd, asset)?;
    validate_extension_matches_type(&new_name, asset.media_type)?;

    let new_relative_path = match cmd.values.get(columns::RELATIVE_PATH) {
        Some(_) => validate_relative_path(
            cmd.values.require_str(columns::RELATIVE_PATH)?,
            asset.media_type,
        )?,
        None => asset.relative_path.clone(),
    };

    let kind = kind_of(asset.media_type)?;
    let old_ext = extension_of(&asset.display_name).unwrap_or_default();
    let new_ext = extension_of(&new_name).unwrap_or_default();
    let old_data = PathBuf::from(&asset.data);
    let new_data = if old_ext == new_ext {
        old_data.clone()
    } else {
        ctx.allocator.derive_path(asset.unique_number, kind, &new_ext)
    };
    let moved = new_data != old_data;
    let now = now_millis();

    let mut changes: Vec<(&str, Value)> = vec![
        (columns::DISPLAY_NAME, Value::from(new_name.as_str())),
        (columns::TITLE, Value::from(title_of(&new_name))),
        (columns::DATE_MODIFIED, Value::Int64(now)),
    ];
    if asset.api_type == ApiVersion::Legacy {
        changes.push((columns::RELATIVE_PATH, Value::from(new_relative_path.as_str())));
        changes.push((
            columns::VIRTUAL_PATH,
            Value::from(virtual_path(asset.api_type, &new_relative_path, &new_name)),
        ));
    }
    if moved {
        changes.push((columns::DATA, Value::from(new_data.to_string_lossy().into_owned())));
        changes.push((columns::MIME_TYPE, Value::from(mime_type_for(&new_ext))));
    }

    let mut tx = ctx.store.transaction()?;
    if asset.api_type == ApiVersion::Legacy {
        ensure_no_conflict(
            &tx,
            cmd.object,
            &new_relative_path,
            &new_name,
            Some(asset.file_id),
        )?;
    }
    if moved {
        fs_ops::move_file(&old_data, &new_data, ctx.allocator.root())?;
    }

    let updated = operations::update_asset_columns(&tx, cmd.object, asset.file_id, &changes)
        .map_err(MediaLibError::from);
    let result = match updated {
        Ok(()) => commit(tx),
        Err(e) => {
            rollback_logged(&mut tx);
            Err(e)
        }
    };
    if let Err(e) = result {
        if moved {
            if let Err(back) = fs_ops::move_file(&new_data, &old_data, ctx.allocator.root()) {
                log::error!(
                    "Failed to move {} back to {}: {}",
                    new_data.display(),
                    old_data.display(),
                    back
                );
            }
        }
        return Err(e);
    }

    let uri = MediaUri::new(cmd.object, asset.file_id);
    if moved {
        ctx.invalidate_thumbnail(&uri);
    }
    ctx.notify(ChangeEvent::new(ChangeKind::Updated, cmd.object, asset.file_id));
    Ok(1)
}

// ── Trash / recover ─────────────────────────────────────────────────────────

/// Set (`trash == true`) or clear the trashed timestamp.
pub fn set_trashed(
    ctx: &LibraryContext,
    cmd: &MediaLibraryCommand,
    trash: bool,
) -> Result<i64, MediaLibError> {
    let asset = require_asset(ctx, cmd)?;
    if asset.is_trashed() == trash {
        return Ok(0);
    }

    let tx = ctx.store.transaction()?;
    if !trash && asset.api_type == ApiVersion::Legacy {
        // A live asset may have taken the name while this one was trashed.
        ensure_no_conflict(
            &tx,
            cmd.object,
            &asset.relative_path,
            &asset.display_name,
            Some(asset.file_id),
        )?;
    }
    operations::set_date_trashed(&tx, cmd.object, asset.file_id, trash.then(now_millis))?;
    commit(tx)?;

    let kind = if trash {
        ChangeKind::Trashed
    } else {
        ChangeKind::Recovered
    };
    ctx.notify(ChangeEvent::new(kind, cmd.object, asset.file_id));
    Ok(1)
}

// ── Open / close ────────────────────────────────────────────────────────────

/// Open an asset's file and return its descriptor.
pub fn open_asset(
    ctx: &LibraryContext,
    cmd: &MediaLibraryCommand,
    mode: &str,
) -> Result<i32, MediaLibError> {
    let mode: OpenMode = mode.parse()?;
    if !OperationObject::asset_objects().contains(&cmd.object) {
        return Err(MediaLibError::InvalidUri(format!("{} has no file to open", cmd.object)));
    }
    let file_id = cmd
        .file_id()
        .ok_or_else(|| MediaLibError::InvalidUri(format!("{} without id", cmd.object)))?;
    let asset = lookup(ctx, cmd.object, file_id)?
        .ok_or_else(|| MediaLibError::InvalidUri(MediaUri::new(cmd.object, file_id).to_string()))?;

    let file = mode
        .open_options()
        .open(&asset.data)
        .map_err(|e| MediaLibError::fs(&asset.data, e))?;
    let uri = MediaUri::new(cmd.object, asset.file_id);
    let fd = ctx.tracker.register(uri, mode.status(), file);
    log::debug!("Opened {} as {} ({:?})", uri, fd, mode.status());
    Ok(fd)
}

/// Close one descriptor (when `cmd` carries `fd`) or every descriptor of the
/// asset. Written pending assets become visible.
pub fn close_asset(ctx: &LibraryContext, cmd: &MediaLibraryCommand) -> Result<i64, MediaLibError> {
    let asset = require_asset(ctx, cmd)?;
    let uri = MediaUri::new(cmd.object, asset.file_id);

    let statuses: Vec<OpenStatus> = match cmd.values.get_i32(FD_KEY) {
        Some(fd) => ctx.tracker.remove_open_status(uri, fd).into_iter().collect(),
        None => ctx.tracker.remove_all(uri),
    };
    if !statuses.iter().any(|s| s.is_write()) {
        return Ok(0);
    }

    let size = std::fs::metadata(&asset.data)
        .map_err(|e| MediaLibError::fs(&asset.data, e))?
        .len() as i64;
    let now = now_millis();
    let tx = ctx.store.transaction()?;
    if asset.is_pending() {
        operations::finish_pending(&tx, cmd.object, asset.file_id, size, now)?;
    } else {
        operations::update_asset_columns(
            &tx,
            cmd.object,
            asset.file_id,
            &[
                (columns::SIZE, Value::Int64(size)),
                (columns::DATE_MODIFIED, Value::Int64(now)),
            ],
        )?;
    }
    commit(tx)?;

    ctx.invalidate_thumbnail(&uri);
    ctx.notify(ChangeEvent::new(ChangeKind::Updated, cmd.object, asset.file_id));
    Ok(0)
}

// ── Query ───────────────────────────────────────────────────────────────────

pub fn query_assets(
    ctx: &LibraryContext,
    cmd: &MediaLibraryCommand,
) -> Result<Vec<FileAsset>, MediaLibError> {
    let clause = cmd.predicates.where_clause();
    let mut args: Vec<Value> = cmd.predicates.args().to_vec();
    let clause = match (clause, cmd.uri) {
        (Some(c), Some(uri)) => {
            args.push(Value::Int64(uri.id));
            Some(format!("({c}) AND file_id = ?{}", args.len()))
        }
        (None, Some(uri)) => {
            args.push(Value::Int64(uri.id));
            Some("file_id = ?1".to_string())
        }
        (clause, None) => clause,
    };
    let conn = ctx.store.lock();
    Ok(queries::query_assets(&conn, cmd.object, clause.as_deref(), &args)?)
}
