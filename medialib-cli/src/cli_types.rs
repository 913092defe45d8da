//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use medialib_core::OperationObject;

#[derive(Parser)]
#[command(name = "medialib")]
#[command(about = "Manage a device-local media library and its index", long_about = None)]
pub(crate) struct Cli {
    /// Library root (defaults to the configured root, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Asset table selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ObjectArg {
    Photo,
    Audio,
    File,
}

impl From<ObjectArg> for OperationObject {
    fn from(arg: ObjectArg) -> Self {
        match arg {
            ObjectArg::Photo => OperationObject::Photo,
            ObjectArg::Audio => OperationObject::Audio,
            ObjectArg::File => OperationObject::File,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create the library layout and index under the root
    Init,

    /// Create an asset, optionally filling it from an existing file
    Create {
        /// Display name, e.g. "song.mp3"
        name: String,

        /// Table to create in (inferred from the extension when omitted)
        #[arg(short = 't', long = "type")]
        object: Option<ObjectArg>,

        /// Create a legacy asset under this relative path (e.g. "Audios/live/")
        #[arg(long)]
        relative_path: Option<String>,

        /// Create a legacy asset even without --relative-path
        #[arg(long)]
        legacy: bool,

        /// Copy content from this file and finish the pending asset
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// List assets
    Ls {
        /// Only this table
        #[arg(short = 't', long = "type")]
        object: Option<ObjectArg>,

        /// Include trashed assets
        #[arg(long)]
        trashed: bool,

        /// Include pending assets
        #[arg(long)]
        pending: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rename or move an asset
    Rename {
        /// Asset URI, e.g. file://media/Audio/3
        uri: String,

        /// New display name
        name: Option<String>,

        /// New relative path (legacy assets only)
        #[arg(long)]
        relative_path: Option<String>,
    },

    /// Delete an asset and its file
    Rm {
        /// Asset URI
        uri: String,
    },

    /// Move an asset to the trash
    Trash {
        /// Asset URI
        uri: String,
    },

    /// Restore a trashed asset
    Recover {
        /// Asset URI
        uri: String,
    },

    /// Mark or unmark an asset as favorite
    Favorite {
        /// Asset URI
        uri: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Manage albums
    Album {
        #[command(subcommand)]
        action: AlbumAction,
    },

    /// Remove index rows without files and stale pending assets
    Repair {
        /// Show planned repairs without executing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum AlbumAction {
    /// Create an album
    Create {
        /// Album name
        name: String,

        /// Parent relative path
        #[arg(long, default_value = "Pictures/")]
        parent: String,
    },

    /// Rename an album and move its assets
    Rename {
        /// Album id
        id: i64,

        /// New name
        name: String,
    },

    /// Delete an empty album
    Rm {
        /// Album id
        id: i64,
    },

    /// List albums
    Ls,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the current settings
    Show,

    /// Write a settings file pointing at the current root
    Init,

    /// Print the settings file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_with_global_flags() {
        let cli = Cli::try_parse_from([
            "medialib", "create", "song.mp3", "--type", "audio", "--root", "/lib", "-v",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/lib")));
        assert!(cli.verbose);
        match cli.command {
            Commands::Create { name, object, legacy, .. } => {
                assert_eq!(name, "song.mp3");
                assert_eq!(object, Some(ObjectArg::Audio));
                assert!(!legacy);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn album_parent_defaults_to_pictures() {
        let cli = Cli::try_parse_from(["medialib", "album", "create", "Holiday"]).unwrap();
        match cli.command {
            Commands::Album {
                action: AlbumAction::Create { parent, .. },
            } => assert_eq!(parent, "Pictures/"),
            _ => panic!("expected album create"),
        }
    }

    #[test]
    fn object_arg_maps_to_table() {
        assert_eq!(OperationObject::from(ObjectArg::Photo), OperationObject::Photo);
        assert_eq!(OperationObject::from(ObjectArg::File).table(), "files");
    }
}
