//! Core types of the media library: media classification, directory rules,
//! validation, command values, URIs and the error taxonomy.

pub mod asset;
pub mod error;
pub mod media_type;
pub mod uri;
pub mod util;
pub mod validate;
pub mod value;

pub use asset::{Album, ApiVersion, FileAsset, OperationObject, columns};
pub use error::{MediaLibError, to_result_code};
pub use media_type::{MediaKind, MediaType, MediaTypeParseError};
pub use uri::MediaUri;
pub use value::{Value, ValuesBucket};
