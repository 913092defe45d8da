use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_core::util::format_size;
use medialib_core::{ApiVersion, FileAsset, MediaUri, OperationObject};
use medialib_lib::{MediaLibraryCommand, OperationType};

use crate::CliError;

/// List assets of one table, or of every asset table.
pub(crate) fn run_list(
    root: Option<PathBuf>,
    object: Option<OperationObject>,
    trashed: bool,
    pending: bool,
    json: bool,
) -> Result<(), CliError> {
    let (_, service) = crate::open_library(root)?;

    let objects: Vec<OperationObject> = match object {
        Some(o) => vec![o],
        None => OperationObject::asset_objects().to_vec(),
    };

    let mut assets: Vec<FileAsset> = Vec::new();
    for object in objects {
        let cmd = MediaLibraryCommand::new(object, OperationType::Query, ApiVersion::Unified);
        assets.extend(
            service
                .query(&cmd)?
                .into_iter()
                .filter(|a| (trashed || !a.is_trashed()) && (pending || !a.is_pending())),
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&assets)?);
        return Ok(());
    }

    if assets.is_empty() {
        log::info!("{}", "No assets".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    for asset in &assets {
        print_asset(asset);
    }
    crate::log_blank();
    log::info!("{} asset(s)", assets.len());
    Ok(())
}

fn print_asset(asset: &FileAsset) {
    let uri = MediaUri::new(asset.object(), asset.file_id);
    let mut flags = Vec::new();
    if asset.is_pending() {
        flags.push("pending");
    }
    if asset.is_trashed() {
        flags.push("trashed");
    }
    if asset.is_favorite {
        flags.push("favorite");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    let location = match asset.api_type {
        ApiVersion::Legacy => asset.virtual_path.clone(),
        ApiVersion::Unified => asset.display_name.clone(),
    };

    log::info!(
        "  {:<28} {:>9}  {}{}",
        uri.to_string().if_supports_color(Stdout, |t| t.cyan()),
        format_size(u64::try_from(asset.size).unwrap_or(0)),
        location,
        flags.if_supports_color(Stdout, |t| t.dimmed()),
    );
}
