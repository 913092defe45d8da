use medialib_core::MediaLibError;
use medialib_lib::SettingsError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Library operation failed
    #[error("{} (code {})", .0, .0.code())]
    Library(#[from] MediaLibError),

    /// Settings could not be read or written
    #[error("Config error: {0}")]
    Config(#[from] SettingsError),

    /// Bad command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
