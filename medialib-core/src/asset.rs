//! Asset model: the typed view of one index row, the tables assets live in,
//! and the API surfaces that create them.

use serde::{Deserialize, Serialize};

use crate::media_type::MediaType;

/// Column names shared by every asset table.
pub mod columns {
    pub const FILE_ID: &str = "file_id";
    pub const DATA: &str = "data";
    pub const SIZE: &str = "size";
    pub const TITLE: &str = "title";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const MEDIA_TYPE: &str = "media_type";
    pub const MIME_TYPE: &str = "mime_type";
    pub const OWNER_PACKAGE: &str = "owner_package";
    pub const DATE_ADDED: &str = "date_added";
    pub const DATE_MODIFIED: &str = "date_modified";
    pub const DATE_TAKEN: &str = "date_taken";
    pub const TIME_PENDING: &str = "time_pending";
    pub const DATE_TRASHED: &str = "date_trashed";
    pub const IS_FAVORITE: &str = "is_favorite";
    pub const HIDDEN: &str = "hidden";
    pub const RELATIVE_PATH: &str = "relative_path";
    pub const VIRTUAL_PATH: &str = "virtual_path";
    pub const UNIQUE_NUMBER: &str = "unique_number";
    pub const API_TYPE: &str = "api_type";

    /// Every asset column in table order.
    pub const ALL: &[&str] = &[
        FILE_ID,
        DATA,
        SIZE,
        TITLE,
        DISPLAY_NAME,
        MEDIA_TYPE,
        MIME_TYPE,
        OWNER_PACKAGE,
        DATE_ADDED,
        DATE_MODIFIED,
        DATE_TAKEN,
        TIME_PENDING,
        DATE_TRASHED,
        IS_FAVORITE,
        HIDDEN,
        RELATIVE_PATH,
        VIRTUAL_PATH,
        UNIQUE_NUMBER,
        API_TYPE,
    ];

    pub fn is_asset_column(name: &str) -> bool {
        ALL.contains(&name)
    }

    pub const ALBUM_ID: &str = "album_id";
    pub const ALBUM_NAME: &str = "album_name";
}

/// The object a command addresses. Each asset object owns one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationObject {
    Photo,
    Audio,
    File,
    Album,
}

impl OperationObject {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Photo => "photos",
            Self::Audio => "audios",
            Self::File => "files",
            Self::Album => "albums",
        }
    }

    /// Segment used in `file://media/<segment>/<id>` URIs.
    pub fn uri_segment(&self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Audio => "Audio",
            Self::File => "File",
            Self::Album => "Album",
        }
    }

    /// The table a new asset of `media_type` is stored in.
    pub fn for_media_type(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Image | MediaType::Video => Self::Photo,
            MediaType::Audio => Self::Audio,
            MediaType::File => Self::File,
            MediaType::Album => Self::Album,
        }
    }

    /// Whether `media_type` may be stored in this object's table.
    pub fn accepts(&self, media_type: MediaType) -> bool {
        Self::for_media_type(media_type) == *self
    }

    pub fn asset_objects() -> &'static [OperationObject] {
        &[Self::Photo, Self::Audio, Self::File]
    }
}

impl std::fmt::Display for OperationObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri_segment())
    }
}

/// API surface an asset was created through.
///
/// Legacy assets carry a caller-chosen relative path and unique names within
/// it; unified assets live only at their derived path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    Legacy,
    Unified,
}

impl ApiVersion {
    /// Value stored in the `api_type` mask column.
    pub fn mask(&self) -> i32 {
        match self {
            Self::Legacy => 1,
            Self::Unified => 2,
        }
    }

    pub fn from_mask(mask: i32) -> Option<Self> {
        match mask {
            1 => Some(Self::Legacy),
            2 => Some(Self::Unified),
            _ => None,
        }
    }
}

/// One asset row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAsset {
    pub file_id: i64,
    pub data: String,
    pub size: i64,
    pub title: String,
    pub display_name: String,
    pub media_type: MediaType,
    pub mime_type: String,
    pub owner_package: String,
    pub date_added: i64,
    pub date_modified: i64,
    pub date_taken: i64,
    pub time_pending: i64,
    pub date_trashed: i64,
    pub is_favorite: bool,
    pub hidden: bool,
    pub relative_path: String,
    pub virtual_path: String,
    pub unique_number: i64,
    pub api_type: ApiVersion,
}

impl FileAsset {
    pub fn is_pending(&self) -> bool {
        self.time_pending != 0
    }

    pub fn is_trashed(&self) -> bool {
        self.date_trashed != 0
    }

    pub fn extension(&self) -> Option<&str> {
        crate::validate::split_extension(&self.display_name).map(|(_, ext)| ext)
    }

    pub fn object(&self) -> OperationObject {
        OperationObject::for_media_type(self.media_type)
    }
}

/// One logical album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub album_id: i64,
    pub album_name: String,
    pub relative_path: String,
    pub date_added: i64,
    pub date_modified: i64,
}

/// Best-effort MIME type for an extension.
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "dng" => "image/x-adobe-dng",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "3gp" => "video/3gpp",
        "3g2" => "video/3gpp2",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "ts" => "video/mp2t",
        "mpeg" | "mpg" => "video/mpeg",
        "mp3" => "audio/mpeg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "amr" => "audio/amr",
        "wma" => "audio/x-ms-wma",
        "mid" | "midi" => "audio/midi",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_types_land_in_their_tables() {
        assert_eq!(OperationObject::for_media_type(MediaType::Video), OperationObject::Photo);
        assert_eq!(OperationObject::for_media_type(MediaType::Audio).table(), "audios");
        assert!(OperationObject::File.accepts(MediaType::File));
        assert!(!OperationObject::Audio.accepts(MediaType::Image));
    }

    #[test]
    fn api_mask_round_trips() {
        for api in [ApiVersion::Legacy, ApiVersion::Unified] {
            assert_eq!(ApiVersion::from_mask(api.mask()), Some(api));
        }
        assert_eq!(ApiVersion::from_mask(0), None);
    }

    #[test]
    fn every_media_extension_has_a_specific_mime() {
        for media_type in [MediaType::Image, MediaType::Video, MediaType::Audio] {
            for ext in media_type.extensions() {
                assert_ne!(mime_type_for(ext), "application/octet-stream", "{ext}");
            }
        }
    }
}
