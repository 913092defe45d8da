pub(crate) mod album;
pub(crate) mod asset;
pub(crate) mod config;
pub(crate) mod init;
pub(crate) mod list;
pub(crate) mod repair;

use medialib_core::{MediaUri, OperationObject};

use crate::CliError;

/// Parse a `file://media/<Object>/<id>` argument.
pub(crate) fn parse_uri(uri: &str) -> Result<MediaUri, CliError> {
    let parsed = MediaUri::parse(uri)?;
    if parsed.object == OperationObject::Album {
        return Err(CliError::invalid_argument(format!(
            "'{uri}' is an album; use the album subcommands"
        )));
    }
    Ok(parsed)
}
