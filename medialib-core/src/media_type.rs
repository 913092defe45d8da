/// Media type classification for indexed assets.
///
/// The numeric values are what the index stores in the `media_type` column,
/// so they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    File,
    Image,
    Video,
    Audio,
    Album,
}

/// All media type variants in column order.
const ALL_MEDIA_TYPES: &[MediaType] = &[
    MediaType::File,
    MediaType::Image,
    MediaType::Video,
    MediaType::Audio,
    MediaType::Album,
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "dng", "svg", "ico",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mkv", "mov", "3gp", "3g2", "avi", "webm", "ts", "mpeg", "mpg",
];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "aac", "flac", "wav", "ogg", "oga", "opus", "m4a", "amr", "wma", "mid", "midi",
];

impl MediaType {
    /// Value stored in the `media_type` column.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::File => 0,
            Self::Image => 1,
            Self::Video => 2,
            Self::Audio => 3,
            Self::Album => 4,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        ALL_MEDIA_TYPES
            .iter()
            .copied()
            .find(|t| t.as_i32() == value)
    }

    /// Lowercase name used for CLI arguments and logs.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Album => "album",
        }
    }

    /// Extensions owned by this media type.
    ///
    /// `File` owns every extension not claimed by another type, so its
    /// list is empty.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
            Self::Audio => AUDIO_EXTENSIONS,
            Self::File | Self::Album => &[],
        }
    }

    /// Classify an extension (without the dot, any case).
    pub fn from_extension(extension: &str) -> MediaType {
        let lower = extension.to_ascii_lowercase();
        for &media_type in &[Self::Image, Self::Video, Self::Audio] {
            if media_type.extensions().contains(&lower.as_str()) {
                return media_type;
            }
        }
        Self::File
    }

    /// Relative path assigned to legacy assets created without one.
    pub fn default_relative_path(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("Pictures/"),
            Self::Video => Some("Videos/"),
            Self::Audio => Some("Audios/"),
            Self::File => Some("Documents/"),
            Self::Album => None,
        }
    }

    /// Allocation kind for types that own physical files.
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Self::Image => Some(MediaKind::Image),
            Self::Video => Some(MediaKind::Video),
            Self::Audio => Some(MediaKind::Audio),
            Self::File => Some(MediaKind::File),
            Self::Album => None,
        }
    }

    pub fn all() -> &'static [MediaType] {
        ALL_MEDIA_TYPES
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Error returned when a string cannot be parsed into a `MediaType`.
#[derive(Debug, Clone)]
pub struct MediaTypeParseError(pub String);

impl std::fmt::Display for MediaTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown media type: '{}'", self.0)
    }
}

impl std::error::Error for MediaTypeParseError {}

impl std::str::FromStr for MediaType {
    type Err = MediaTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let alias = match lower.as_str() {
            "photo" | "picture" => "image",
            "music" | "sound" => "audio",
            "movie" => "video",
            "document" | "doc" => "file",
            other => other,
        };
        ALL_MEDIA_TYPES
            .iter()
            .copied()
            .find(|t| t.short_name() == alias)
            .ok_or_else(|| MediaTypeParseError(s.to_string()))
    }
}

/// Kinds that draw identifiers from their own unique-number sequence and
/// own a top-level directory of bucketed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    File,
}

impl MediaKind {
    /// Key of this kind's row in the unique-number table.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::File => "file",
        }
    }

    /// Top-level directory under the library root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::File => "File",
        }
    }

    pub fn all() -> &'static [MediaKind] {
        &[Self::Image, Self::Video, Self::Audio, Self::File]
    }
}

// ── Directory rule table ────────────────────────────────────────────────────

/// Root directories of the logical tree and the media types allowed below each.
const DIRECTORY_RULES: &[(&str, &[MediaType])] = &[
    ("Camera", &[MediaType::Image, MediaType::Video]),
    ("Pictures", &[MediaType::Image]),
    ("Videos", &[MediaType::Video]),
    ("Audios", &[MediaType::Audio]),
    ("Documents", &[MediaType::File]),
    (
        "Download",
        &[
            MediaType::Image,
            MediaType::Video,
            MediaType::Audio,
            MediaType::File,
        ],
    ),
];

/// Media types allowed below a root directory, or `None` for an unknown root.
pub fn allowed_types_for_root(root: &str) -> Option<&'static [MediaType]> {
    DIRECTORY_RULES
        .iter()
        .find(|(name, _)| *name == root)
        .map(|(_, types)| *types)
}

/// Names of all known root directories.
pub fn root_dirs() -> impl Iterator<Item = &'static str> {
    DIRECTORY_RULES.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_values_round_trip() {
        for &media_type in MediaType::all() {
            assert_eq!(MediaType::from_i32(media_type.as_i32()), Some(media_type));
        }
        assert_eq!(MediaType::from_i32(99), None);
    }

    #[test]
    fn extensions_classify_case_insensitively() {
        assert_eq!(MediaType::from_extension("MP3"), MediaType::Audio);
        assert_eq!(MediaType::from_extension("Jpg"), MediaType::Image);
        assert_eq!(MediaType::from_extension("mkv"), MediaType::Video);
        assert_eq!(MediaType::from_extension("pdf"), MediaType::File);
        assert_eq!(MediaType::from_extension("abc"), MediaType::File);
    }

    #[test]
    fn extension_tables_are_disjoint() {
        for ext in IMAGE_EXTENSIONS {
            assert!(!VIDEO_EXTENSIONS.contains(ext), "{ext} in image and video");
            assert!(!AUDIO_EXTENSIONS.contains(ext), "{ext} in image and audio");
        }
        for ext in VIDEO_EXTENSIONS {
            assert!(!AUDIO_EXTENSIONS.contains(ext), "{ext} in video and audio");
        }
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("audio".parse::<MediaType>().unwrap(), MediaType::Audio);
        assert_eq!("Photo".parse::<MediaType>().unwrap(), MediaType::Image);
        assert_eq!("doc".parse::<MediaType>().unwrap(), MediaType::File);
        assert!("hologram".parse::<MediaType>().is_err());
    }

    #[test]
    fn only_file_owning_types_have_a_kind() {
        assert_eq!(MediaType::Album.kind(), None);
        assert_eq!(MediaType::Audio.kind(), Some(MediaKind::Audio));
        assert_eq!(MediaType::File.kind(), Some(MediaKind::File));
    }

    #[test]
    fn rule_table_lookups() {
        assert_eq!(
            allowed_types_for_root("Audios"),
            Some(&[MediaType::Audio][..])
        );
        assert!(allowed_types_for_root("Storage").is_none());
        assert!(allowed_types_for_root("Download")
            .unwrap()
            .contains(&MediaType::Video));
        assert_eq!(root_dirs().count(), 6);
    }
}
