//! Display-name, title and relative-path validation.
//!
//! All checks are pure and run before anything touches the index or disk.

use crate::error::MediaLibError;
use crate::media_type::{MediaType, allowed_types_for_root};

/// Longest display name or path segment, in characters.
pub const MAX_NAME_CHARS: usize = 255;

const FORBIDDEN_CHARS: &[char] = &[
    '\\', '/', ':', '*', '?', '"', '\'', '`', '<', '>', '|', '{', '}', '[', ']',
];

fn check_name_chars(name: &str, what: &str) -> Result<(), MediaLibError> {
    if name.is_empty() {
        return Err(MediaLibError::invalid_name(format!("{what} is empty")));
    }
    if name.starts_with('.') {
        return Err(MediaLibError::invalid_name(format!(
            "{what} '{name}' starts with '.'"
        )));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(MediaLibError::invalid_name(format!(
            "{what} longer than {MAX_NAME_CHARS} characters"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(MediaLibError::invalid_name(format!(
            "{what} '{name}' contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

/// Split `name` into `(stem, extension)` at the last dot.
///
/// Returns `None` when there is no dot or the extension is empty.
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

pub fn validate_display_name(name: &str) -> Result<(), MediaLibError> {
    check_name_chars(name, "display name")?;
    if split_extension(name).is_none() {
        return Err(MediaLibError::invalid_name(format!(
            "display name '{name}' has no extension"
        )));
    }
    Ok(())
}

/// Check that the extension of `name` maps to `media_type`.
pub fn validate_extension_matches_type(
    name: &str,
    media_type: MediaType,
) -> Result<(), MediaLibError> {
    let mismatch = || MediaLibError::ExtensionMismatch {
        name: name.to_string(),
        media_type,
    };
    let (_, ext) = split_extension(name).ok_or_else(mismatch)?;
    if MediaType::from_extension(ext) != media_type {
        return Err(mismatch());
    }
    Ok(())
}

/// Normalize a relative path (no leading `/`, exactly one trailing `/`)
/// and check its segments. The root is not checked.
pub fn normalize_relative_path(path: &str) -> Result<String, MediaLibError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    if normalized == "/" {
        return Err(MediaLibError::invalid_path("relative path is empty"));
    }

    for segment in normalized[..normalized.len() - 1].split('/') {
        if segment.is_empty() {
            return Err(MediaLibError::invalid_path(format!(
                "'{path}' has an empty segment"
            )));
        }
        if segment == "." || segment == ".." {
            return Err(MediaLibError::invalid_path(format!(
                "'{path}' contains a '{segment}' segment"
            )));
        }
        if segment.chars().count() > MAX_NAME_CHARS {
            return Err(MediaLibError::invalid_path(format!(
                "'{path}' has a segment longer than {MAX_NAME_CHARS} characters"
            )));
        }
        if segment
            .chars()
            .any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control())
        {
            return Err(MediaLibError::invalid_path(format!(
                "'{path}' contains a forbidden character"
            )));
        }
    }
    Ok(normalized)
}

/// First segment of a normalized relative path.
pub fn root_of(normalized: &str) -> &str {
    normalized.split('/').next().unwrap_or_default()
}

/// Validate a legacy relative path for `media_type` and return it normalized.
pub fn validate_relative_path(
    path: &str,
    media_type: MediaType,
) -> Result<String, MediaLibError> {
    let normalized = normalize_relative_path(path)?;
    match allowed_types_for_root(root_of(&normalized)) {
        Some(types) if types.contains(&media_type) => Ok(normalized),
        _ => Err(MediaLibError::MediaTypeMismatch {
            path: normalized,
            media_type,
        }),
    }
}

/// Album names follow display-name character rules but carry no extension.
pub fn validate_album_name(name: &str) -> Result<(), MediaLibError> {
    check_name_chars(name, "album name")
}

/// A title is valid when it forms a valid display name with `extension`.
pub fn validate_title(title: &str, extension: &str) -> Result<String, MediaLibError> {
    if title.is_empty() {
        return Err(MediaLibError::invalid_name("title is empty"));
    }
    let name = format!("{title}.{extension}");
    validate_display_name(&name)?;
    Ok(name)
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
