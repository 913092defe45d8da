use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_core::{ApiVersion, MediaUri, OperationObject, ValuesBucket, columns};
use medialib_lib::{MediaLibraryCommand, OperationType};

use crate::CliError;

fn album_uri(id: i64) -> MediaUri {
    MediaUri::new(OperationObject::Album, id)
}

pub(crate) fn run_album_create(root: Option<PathBuf>, name: &str, parent: &str) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;
    let cmd = MediaLibraryCommand::new(OperationObject::Album, OperationType::Create, ApiVersion::Legacy)
        .with_values(
            ValuesBucket::new()
                .with(columns::ALBUM_NAME, name)
                .with(columns::RELATIVE_PATH, parent),
        );
    let id = service.execute(&cmd)?;
    log::info!(
        "Created album {} ({})",
        name.if_supports_color(Stdout, |t| t.bold()),
        album_uri(id).if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

pub(crate) fn run_album_rename(root: Option<PathBuf>, id: i64, name: &str) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;
    let cmd = MediaLibraryCommand::for_uri(album_uri(id), OperationType::Update, ApiVersion::Legacy)
        .with_values(ValuesBucket::new().with(columns::ALBUM_NAME, name));
    let changed = service.execute(&cmd)?;
    if changed == 0 {
        log::info!("{}", "Name unchanged".if_supports_color(Stdout, |t| t.dimmed()));
    } else {
        log::info!(
            "Renamed album {} to {} ({} other row(s) moved)",
            id,
            name.if_supports_color(Stdout, |t| t.bold()),
            changed - 1,
        );
    }
    Ok(())
}

pub(crate) fn run_album_delete(root: Option<PathBuf>, id: i64) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;
    let cmd = MediaLibraryCommand::for_uri(album_uri(id), OperationType::Delete, ApiVersion::Legacy);
    service.execute(&cmd)?;
    log::info!("Deleted album {}", id);
    Ok(())
}

pub(crate) fn run_album_list(root: Option<PathBuf>) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;
    let albums = service.query_albums()?;
    if albums.is_empty() {
        log::info!("{}", "No albums".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }
    for album in &albums {
        log::info!(
            "  {:>4}  {:<24} {}",
            album.album_id,
            album.album_name.if_supports_color(Stdout, |t| t.bold()),
            album.relative_path.if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
