use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use medialib_lib::RepairReason;

use crate::CliError;

/// Plan and (unless `dry_run`) execute an index repair.
pub(crate) fn run_repair(root: Option<PathBuf>, dry_run: bool) -> Result<(), CliError> {
    let (settings, service) = crate::open_library(root)?;

    log::info!(
        "Checking library at: {}",
        settings.root().display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if dry_run {
        log::info!(
            "{}",
            "Dry run: nothing will be removed".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let plan = service.plan_repair()?;
    if plan.is_empty() {
        log::info!(
            "{} {} asset(s) consistent",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            plan.consistent,
        );
        return Ok(());
    }

    for action in &plan.actions {
        log::info!(
            "  {} {} {}",
            action.uri.if_supports_color(Stdout, |t| t.cyan()),
            action.display_name,
            format!("({})", action.reason.description()).if_supports_color(Stdout, |t| t.dimmed()),
        );
        log::debug!("    {}", action.data.display());
    }
    crate::log_blank();
    log::info!(
        "{} missing file(s), {} stale pending asset(s), {} consistent",
        plan.count(RepairReason::MissingFile),
        plan.count(RepairReason::StalePending),
        plan.consistent,
    );

    if dry_run {
        return Ok(());
    }

    let summary = service.execute_repair(&plan)?;
    log::info!(
        "{} Removed {} row(s) and {} file(s)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.rows_removed,
        summary.files_removed,
    );
    if !summary.skipped.is_empty() {
        log::info!(
            "  {}",
            format!("{} row(s) changed since planning, left alone", summary.skipped.len())
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    for error in &summary.errors {
        log::warn!(
            "  {} {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            error,
        );
    }
    Ok(())
}
