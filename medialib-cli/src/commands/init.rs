use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_core::MediaKind;

use crate::CliError;

/// Create (or verify) the library layout and index.
pub(crate) fn run_init(root: Option<PathBuf>) -> Result<(), CliError> {
    let (settings, service) = crate::open_library(root)?;

    log::info!(
        "{} Library ready at {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        settings.root().display().if_supports_color(Stdout, |t| t.cyan()),
    );
    for kind in MediaKind::all() {
        log::info!(
            "  {}",
            service
                .allocator()
                .kind_root(*kind)
                .display()
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!(
        "  Index: {}",
        settings.database_path().display().if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}
