use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_lib::settings::{load_settings_string, resolve_settings, settings_path};

use crate::CliError;

/// Show the settings file and the values in effect.
pub(crate) fn run_config_show(root: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings_path();
    log::info!(
        "{}",
        "Media Library Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let settings = resolve_settings(root)?;
    crate::log_blank();
    log::info!("  Root:           {}", settings.root().display());
    log::info!("  Database:       {}", settings.database_path().display());
    log::info!("  Thumbnails:     {}", settings.thumbnails_dir().display());
    log::info!("  Bucket size:    {}", settings.allocator.bucket_size);
    log::info!(
        "  Pending expiry: {}s",
        settings.pending.garbage_timeout_secs
    );

    if let Some(contents) = load_settings_string() {
        crate::log_blank();
        for line in contents.lines() {
            log::info!("  {}", line.if_supports_color(Stdout, |t| t.dimmed()));
        }
    }
    Ok(())
}

/// Write the settings file with the resolved root filled in.
pub(crate) fn run_config_init(root: Option<PathBuf>) -> Result<(), CliError> {
    let mut settings = resolve_settings(root)?;
    settings.library.root = Some(std::path::absolute(settings.root())?);
    let path = settings_path();
    settings.save_to(&path)?;
    log::info!(
        "Wrote {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}
