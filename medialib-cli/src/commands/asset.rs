use std::fs::File;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_core::util::{extension_of, format_size};
use medialib_core::{ApiVersion, MediaType, MediaUri, OperationObject, ValuesBucket, columns};
use medialib_lib::command::{FD_KEY, MODE_KEY};
use medialib_lib::{MediaLibraryCommand, MediaLibraryService, OperationType};

use super::parse_uri;
use crate::CliError;

/// Create an asset and optionally copy content into it.
pub(crate) fn run_create(
    root: Option<PathBuf>,
    name: &str,
    object: Option<OperationObject>,
    relative_path: Option<String>,
    legacy: bool,
    from: Option<PathBuf>,
) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;

    let object = object.unwrap_or_else(|| {
        let media_type = extension_of(name)
            .map(|ext| MediaType::from_extension(&ext))
            .unwrap_or(MediaType::File);
        OperationObject::for_media_type(media_type)
    });
    let api = if legacy || relative_path.is_some() {
        ApiVersion::Legacy
    } else {
        ApiVersion::Unified
    };

    let mut values = ValuesBucket::new().with(columns::DISPLAY_NAME, name);
    if let Some(path) = relative_path {
        values.put(columns::RELATIVE_PATH, path);
    }
    let create = MediaLibraryCommand::new(object, OperationType::Create, api).with_values(values);
    let uri = MediaUri::new(object, service.execute(&create)?);

    log::info!(
        "Created {} {}",
        uri.if_supports_color(Stdout, |t| t.cyan()),
        name.if_supports_color(Stdout, |t| t.bold()),
    );

    if let Some(source) = from {
        let copied = fill_from(&service, uri, api, &source)?;
        log::info!(
            "  Copied {} from {}",
            format_size(copied),
            source.display().if_supports_color(Stdout, |t| t.dimmed()),
        );
    } else {
        log::info!(
            "  {}",
            "Pending until written and closed".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

/// Open `uri` for writing, copy `source` into it and close it.
fn fill_from(
    service: &MediaLibraryService,
    uri: MediaUri,
    api: ApiVersion,
    source: &std::path::Path,
) -> Result<u64, CliError> {
    let mut input = File::open(source)?;

    let open = MediaLibraryCommand::for_uri(uri, OperationType::Open, api)
        .with_values(ValuesBucket::new().with(MODE_KEY, "wt"));
    let fd = i32::try_from(service.execute(&open)?)
        .map_err(|_| CliError::invalid_argument("descriptor out of range"))?;
    let mut output = service
        .take_file(fd)
        .ok_or_else(|| std::io::Error::other(format!("descriptor {fd} has no file")))?;
    let copied = std::io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    drop(output);

    let close = MediaLibraryCommand::for_uri(uri, OperationType::Close, api)
        .with_values(ValuesBucket::new().with(FD_KEY, fd));
    service.execute(&close)?;
    Ok(copied)
}

pub(crate) fn run_rename(
    root: Option<PathBuf>,
    uri: &str,
    name: Option<String>,
    relative_path: Option<String>,
) -> Result<(), CliError> {
    let uri = parse_uri(uri)?;
    if name.is_none() && relative_path.is_none() {
        return Err(CliError::invalid_argument(
            "give a new name, --relative-path, or both",
        ));
    }
    let (_, service) = crate::open_library(root)?;

    let mut values = ValuesBucket::new();
    if let Some(name) = &name {
        values.put(columns::DISPLAY_NAME, name.as_str());
    }
    if let Some(path) = relative_path {
        values.put(columns::RELATIVE_PATH, path);
    }
    let cmd = MediaLibraryCommand::for_uri(uri, OperationType::Update, ApiVersion::Legacy)
        .with_values(values);
    service.execute(&cmd)?;

    log::info!(
        "Updated {}{}",
        uri.if_supports_color(Stdout, |t| t.cyan()),
        name.map(|n| format!(" -> {n}")).unwrap_or_default(),
    );
    Ok(())
}

pub(crate) fn run_delete(root: Option<PathBuf>, uri: &str) -> Result<(), CliError> {
    let uri = parse_uri(uri)?;
    let (_, service) = crate::open_library(root)?;
    let cmd = MediaLibraryCommand::for_uri(uri, OperationType::Delete, ApiVersion::Unified);
    service.execute(&cmd)?;
    log::info!("Deleted {}", uri.if_supports_color(Stdout, |t| t.cyan()));
    Ok(())
}

/// Trash (`trash == true`) or recover an asset.
pub(crate) fn run_trash(root: Option<PathBuf>, uri: &str, trash: bool) -> Result<(), CliError> {
    let uri = parse_uri(uri)?;
    let (_, service) = crate::open_library(root)?;
    let operation = if trash {
        OperationType::Trash
    } else {
        OperationType::Recover
    };
    let cmd = MediaLibraryCommand::for_uri(uri, operation, ApiVersion::Unified);
    let changed = service.execute(&cmd)?;

    let verb = if trash { "Trashed" } else { "Recovered" };
    if changed == 0 {
        log::info!(
            "{} {}",
            uri.if_supports_color(Stdout, |t| t.cyan()),
            "unchanged".if_supports_color(Stdout, |t| t.dimmed()),
        );
    } else {
        log::info!("{} {}", verb, uri.if_supports_color(Stdout, |t| t.cyan()));
    }
    Ok(())
}

pub(crate) fn run_favorite(root: Option<PathBuf>, uri: &str, favorite: bool) -> Result<(), CliError> {
    let uri = parse_uri(uri)?;
    let (_, service) = crate::open_library(root)?;
    let cmd = MediaLibraryCommand::for_uri(uri, OperationType::Update, ApiVersion::Unified)
        .with_values(ValuesBucket::new().with(columns::IS_FAVORITE, favorite));
    service.execute(&cmd)?;
    log::info!(
        "{} {}",
        if favorite { "Favorited" } else { "Unfavorited" },
        uri.if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
