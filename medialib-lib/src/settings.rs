//! Application settings (library root, database and thumbnail locations,
//! allocator and pending-asset tuning).
//!
//! The settings file is `~/.config/medialib/settings.toml`. Every field has
//! a default, so a missing file or a partial one is fine.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocator::DEFAULT_BUCKET_SIZE;

/// Pending assets older than this are garbage (one day).
pub const DEFAULT_GARBAGE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Directory under the library root holding the index and caches.
pub const STATE_DIR: &str = ".medialib";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub allocator: AllocatorSettings,
    pub pending: PendingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Library root. Falls back to the current directory.
    pub root: Option<PathBuf>,
    /// Index database, default `<root>/.medialib/index.db`.
    pub database: Option<PathBuf>,
    /// Thumbnail cache, default `<root>/.medialib/thumbs`.
    pub thumbnails: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorSettings {
    pub bucket_size: i64,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingSettings {
    pub garbage_timeout_secs: u64,
}

impl Default for PendingSettings {
    fn default() -> Self {
        Self {
            garbage_timeout_secs: DEFAULT_GARBAGE_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Settings for a library at `root` with every other field defaulted.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let mut settings = Self::default();
        settings.library.root = Some(root.into());
        settings
    }

    /// Load from the canonical settings file.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to `path` atomically.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Library root, or the current directory when unset.
    pub fn root(&self) -> PathBuf {
        self.library
            .root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn database_path(&self) -> PathBuf {
        self.library
            .database
            .clone()
            .unwrap_or_else(|| self.root().join(STATE_DIR).join("index.db"))
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.library
            .thumbnails
            .clone()
            .unwrap_or_else(|| self.root().join(STATE_DIR).join("thumbs"))
    }

    pub fn garbage_timeout_millis(&self) -> i64 {
        i64::try_from(self.pending.garbage_timeout_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

/// Canonical path to the settings file: `~/.config/medialib/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("medialib").join("settings.toml")
}

/// Load settings, applying a CLI root override on top.
///
/// Priority for the root: CLI override, then `library.root`, then the
/// current directory.
pub fn resolve_settings(cli_root: Option<PathBuf>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::load()?;
    if let Some(root) = cli_root {
        settings.library.root = Some(root);
    }
    Ok(settings)
}

/// Load the settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("none.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.allocator.bucket_size, 1000);
        assert_eq!(settings.pending.garbage_timeout_secs, 86_400);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[allocator]\nbucket_size = 10\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.allocator.bucket_size, 10);
        assert_eq!(settings.pending, PendingSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg/settings.toml");
        let settings = Settings::for_root("/media/lib");
        settings.save_to(&path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn derived_locations_follow_root() {
        let settings = Settings::for_root("/media/lib");
        assert_eq!(
            settings.database_path(),
            PathBuf::from("/media/lib/.medialib/index.db")
        );
        assert_eq!(
            settings.thumbnails_dir(),
            PathBuf::from("/media/lib/.medialib/thumbs")
        );
        assert_eq!(settings.garbage_timeout_millis(), 86_400_000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[allocator\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
