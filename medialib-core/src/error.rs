use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media_type::MediaType;

pub const E_OK: i32 = 0;
pub const E_INVALID_VALUES: i32 = -1;
pub const E_INVALID_DISPLAY_NAME: i32 = -2;
pub const E_INVALID_PATH: i32 = -3;
pub const E_CHECK_EXTENSION_FAIL: i32 = -4;
pub const E_CHECK_MEDIATYPE_FAIL: i32 = -5;
pub const E_HAS_FS_ERROR: i32 = -6;
pub const E_HAS_DB_ERROR: i32 = -7;
pub const E_INVALID_FILEID: i32 = -8;
pub const E_INVALID_URI: i32 = -9;
pub const E_INVALID_MODE: i32 = -10;
pub const E_PERMISSION_DENIED: i32 = -11;

/// Errors produced by media library operations.
///
/// Every variant maps onto one signed result code (see [`MediaLibError::code`])
/// so that callers on the command boundary see the classic
/// "negative means error" contract.
#[derive(Debug, Error)]
pub enum MediaLibError {
    /// A parameter is missing, has the wrong type, or may not be changed
    #[error("Invalid values: {0}")]
    InvalidValues(String),

    #[error("Invalid display name: {0}")]
    InvalidName(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The display name's extension belongs to another media type
    #[error("Extension of '{name}' does not match media type {media_type}")]
    ExtensionMismatch { name: String, media_type: MediaType },

    /// The relative path's root does not accept this media type
    #[error("Path '{path}' does not accept media type {media_type}")]
    MediaTypeMismatch { path: String, media_type: MediaType },

    /// A filesystem call failed
    #[error("Filesystem error on {path}: {source}")]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An index store call failed or affected no rows
    #[error("Database error ({code}): {message}")]
    Db { code: i32, message: String },

    /// Another asset already owns this logical name
    #[error("Name conflict: '{name}' already exists in '{relative_path}'")]
    NameConflict { name: String, relative_path: String },

    #[error("Invalid file id: {0}")]
    InvalidFileId(String),

    #[error("Invalid uri: {0}")]
    InvalidUri(String),

    #[error("Invalid open mode: '{0}'")]
    InvalidMode(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl MediaLibError {
    pub fn invalid_values(msg: impl Into<String>) -> Self {
        Self::InvalidValues(msg.into())
    }

    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Fs {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn db(code: i32, msg: impl Into<String>) -> Self {
        Self::Db {
            code,
            message: msg.into(),
        }
    }

    /// Signed result code reported on the command boundary.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidValues(_) => E_INVALID_VALUES,
            Self::InvalidName(_) => E_INVALID_DISPLAY_NAME,
            Self::InvalidPath(_) => E_INVALID_PATH,
            Self::ExtensionMismatch { .. } => E_CHECK_EXTENSION_FAIL,
            Self::MediaTypeMismatch { .. } => E_CHECK_MEDIATYPE_FAIL,
            Self::Fs { .. } => E_HAS_FS_ERROR,
            Self::Db { .. } | Self::NameConflict { .. } => E_HAS_DB_ERROR,
            Self::InvalidFileId(_) => E_INVALID_FILEID,
            Self::InvalidUri(_) => E_INVALID_URI,
            Self::InvalidMode(_) => E_INVALID_MODE,
            Self::PermissionDenied(_) => E_PERMISSION_DENIED,
        }
    }

    /// Raw OS error code of a filesystem failure, if this is one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::Fs { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// Collapse a typed result into the signed boundary value.
///
/// Successful values must already be non-negative; ids and row counts that
/// do not fit an `i32` are reported as a database error.
pub fn to_result_code<T: TryInto<i32>>(result: Result<T, MediaLibError>) -> i32 {
    match result {
        Ok(value) => value.try_into().unwrap_or(E_HAS_DB_ERROR),
        Err(e) => e.code(),
    }
}
