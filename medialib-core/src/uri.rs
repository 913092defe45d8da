use crate::asset::OperationObject;
use crate::error::MediaLibError;

const URI_PREFIX: &str = "file://media/";

/// A parsed `file://media/<Object>/<id>` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaUri {
    pub object: OperationObject,
    pub id: i64,
}

impl MediaUri {
    pub fn new(object: OperationObject, id: i64) -> Self {
        Self { object, id }
    }

    pub fn parse(uri: &str) -> Result<Self, MediaLibError> {
        let invalid = || MediaLibError::InvalidUri(uri.to_string());
        let rest = uri.strip_prefix(URI_PREFIX).ok_or_else(invalid)?;
        let (segment, id) = rest.split_once('/').ok_or_else(invalid)?;
        let object = match segment {
            "Photo" => OperationObject::Photo,
            "Audio" => OperationObject::Audio,
            "File" => OperationObject::File,
            "Album" => OperationObject::Album,
            _ => return Err(invalid()),
        };
        // Trailing query strings and fragments are not part of the id.
        let id = id.split(['?', '#']).next().unwrap_or_default();
        let id: i64 = id.parse().map_err(|_| invalid())?;
        if id <= 0 {
            return Err(invalid());
        }
        Ok(Self { object, id })
    }
}

impl std::fmt::Display for MediaUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{URI_PREFIX}{}/{}", self.object.uri_segment(), self.id)
    }
}

impl std::str::FromStr for MediaUri {
    type Err = MediaLibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses() {
        let uri = MediaUri::new(OperationObject::Audio, 12);
        assert_eq!(uri.to_string(), "file://media/Audio/12");
        assert_eq!(MediaUri::parse("file://media/Audio/12").unwrap(), uri);
        assert_eq!(
            MediaUri::parse("file://media/Photo/3?op=x").unwrap().id,
            3
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "",
            "file://media/Audio",
            "file://media/Audio/",
            "file://media/Audio/abc",
            "file://media/Audio/0",
            "file://media/Song/1",
            "http://media/Audio/1",
        ] {
            assert!(
                matches!(MediaUri::parse(bad), Err(MediaLibError::InvalidUri(_))),
                "{bad} accepted"
            );
        }
    }
}
