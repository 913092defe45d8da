use crate::validate::split_extension;

/// Title of an asset: its display name without the last extension.
///
/// Names without a usable extension are their own title.
pub fn title_of(display_name: &str) -> &str {
    split_extension(display_name)
        .map(|(stem, _)| stem)
        .unwrap_or(display_name)
}

/// Lower-cased extension of a display name.
pub fn extension_of(display_name: &str) -> Option<String> {
    split_extension(display_name).map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Format a byte count with fractional KB/MB/GB (e.g., "1.5 KB", "2.3 MB").
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB * KB {
        format!("{:.1} GB", b / (KB * KB * KB))
    } else if b >= KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_strips_last_extension_only() {
        assert_eq!(title_of("audio.mp3"), "audio");
        assert_eq!(title_of("a.b.mp3"), "a.b");
        assert_eq!(title_of("noext"), "noext");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Clip.MP4").as_deref(), Some("mp4"));
        assert_eq!(extension_of("clip."), None);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }
}
