//! medialib CLI
//!
//! Command-line front end for a device-local media library.

mod cli_types;
mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_lib::settings::resolve_settings;
use medialib_lib::{Collaborators, MediaLibraryService, Settings, ThumbnailCache};

use cli_types::{AlbumAction, Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

/// Print an empty line through the logger so `--quiet` suppresses it too.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| match record.level() {
            Level::Info | Level::Debug | Level::Trace => writeln!(buf, "{}", record.args()),
            level => writeln!(
                buf,
                "{}: {}",
                level.as_str().to_lowercase(),
                record.args()
            ),
        });
    }
    builder.target(env_logger::Target::Stdout).init();
}

/// Resolve settings and open the library they describe.
pub(crate) fn open_library(root: Option<PathBuf>) -> Result<(Settings, MediaLibraryService), CliError> {
    let settings = resolve_settings(root)?;
    let collaborators =
        Collaborators::default().with_thumbnails(ThumbnailCache::new(settings.thumbnails_dir()));
    let service = MediaLibraryService::init(&settings, collaborators)?;
    Ok((settings, service))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let root = cli.root;
    match cli.command {
        Commands::Init => commands::init::run_init(root),
        Commands::Create {
            name,
            object,
            relative_path,
            legacy,
            from,
        } => commands::asset::run_create(
            root,
            &name,
            object.map(Into::into),
            relative_path,
            legacy,
            from,
        ),
        Commands::Ls {
            object,
            trashed,
            pending,
            json,
        } => commands::list::run_list(root, object.map(Into::into), trashed, pending, json),
        Commands::Rename {
            uri,
            name,
            relative_path,
        } => commands::asset::run_rename(root, &uri, name, relative_path),
        Commands::Rm { uri } => commands::asset::run_delete(root, &uri),
        Commands::Trash { uri } => commands::asset::run_trash(root, &uri, true),
        Commands::Recover { uri } => commands::asset::run_trash(root, &uri, false),
        Commands::Favorite { uri, off } => commands::asset::run_favorite(root, &uri, !off),
        Commands::Album { action } => match action {
            AlbumAction::Create { name, parent } => {
                commands::album::run_album_create(root, &name, &parent)
            }
            AlbumAction::Rename { id, name } => commands::album::run_album_rename(root, id, &name),
            AlbumAction::Rm { id } => commands::album::run_album_delete(root, id),
            AlbumAction::Ls => commands::album::run_album_list(root),
        },
        Commands::Repair { dry_run } => commands::repair::run_repair(root, dry_run),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(root),
            ConfigAction::Init => commands::config::run_config_init(root),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e.if_supports_color(Stdout, |t| t.red()));
        std::process::exit(1);
    }
}
