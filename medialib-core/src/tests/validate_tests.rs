use super::*;

fn repeat(c: char, n: usize) -> String {
    std::iter::repeat_n(c, n).collect()
}

// -- display names --

#[test]
fn plain_names_pass() {
    for name in ["audio.mp3", "a.b.c.mp3", "My Song (live).flac", "照片.jpg"] {
        assert!(validate_display_name(name).is_ok(), "{name} rejected");
    }
}

#[test]
fn empty_and_hidden_names_fail() {
    assert!(matches!(
        validate_display_name(""),
        Err(MediaLibError::InvalidName(_))
    ));
    assert!(validate_display_name(".audio.mp3").is_err());
}

#[test]
fn missing_or_empty_extension_fails() {
    assert!(validate_display_name("audio").is_err());
    assert!(validate_display_name("audio.").is_err());
}

#[test]
fn forbidden_characters_fail() {
    for c in ['\\', '/', ':', '*', '?', '"', '\'', '`', '<', '>', '|', '{', '}', '[', ']'] {
        let name = format!("au{c}dio.mp3");
        assert!(validate_display_name(&name).is_err(), "{c:?} accepted");
    }
    assert!(validate_display_name("au\u{7}dio.mp3").is_err());
}

#[test]
fn ascii_length_boundary() {
    let ok = format!("{}.mp3", repeat('a', 251));
    assert_eq!(ok.chars().count(), 255);
    assert!(validate_display_name(&ok).is_ok());

    let too_long = format!("{}.mp3", repeat('a', 252));
    assert!(validate_display_name(&too_long).is_err());

    let way_too_long = format!("{}.mp3", repeat('a', 256));
    assert!(validate_display_name(&way_too_long).is_err());
}

#[test]
fn multibyte_length_counts_characters() {
    let ok = format!("{}.mp3", repeat('中', 251));
    assert!(ok.len() > 255);
    assert!(validate_display_name(&ok).is_ok());

    let too_long = format!("{}.mp3", repeat('中', 256));
    assert!(validate_display_name(&too_long).is_err());
}

// -- extension vs type --

#[test]
fn extension_must_match_type() {
    assert!(validate_extension_matches_type("audio.mp3", MediaType::Audio).is_ok());
    assert!(validate_extension_matches_type("AUDIO.MP3", MediaType::Audio).is_ok());
    assert!(matches!(
        validate_extension_matches_type("audio.abc", MediaType::Audio),
        Err(MediaLibError::ExtensionMismatch { .. })
    ));
    assert!(validate_extension_matches_type("audio.mp4", MediaType::Audio).is_err());
    assert!(validate_extension_matches_type("notes.abc", MediaType::File).is_ok());
    assert!(validate_extension_matches_type("clip.mp4", MediaType::File).is_err());
}

#[test]
fn last_extension_wins() {
    assert!(validate_extension_matches_type("a.jpg.mp3", MediaType::Audio).is_ok());
    assert!(validate_extension_matches_type("a.mp3.jpg", MediaType::Audio).is_err());
}

// -- relative paths --

#[test]
fn relative_path_is_normalized() {
    assert_eq!(
        validate_relative_path("/Audios/abc", MediaType::Audio).unwrap(),
        "Audios/abc/"
    );
    assert_eq!(
        validate_relative_path("Audios/", MediaType::Audio).unwrap(),
        "Audios/"
    );
    assert_eq!(
        validate_relative_path("Download/x/y/", MediaType::File).unwrap(),
        "Download/x/y/"
    );
}

#[test]
fn malformed_relative_paths_fail() {
    for path in ["", "/", "Audios//", "Audios/./x", "Audios/../x", "Audios/a\"b"] {
        assert!(
            matches!(
                validate_relative_path(path, MediaType::Audio),
                Err(MediaLibError::InvalidPath(_))
            ),
            "{path} accepted"
        );
    }
    let long = format!("Audios/{}/", repeat('x', 256));
    assert!(validate_relative_path(&long, MediaType::Audio).is_err());
}

#[test]
fn root_must_allow_type() {
    assert!(matches!(
        validate_relative_path("Storage/abc", MediaType::Audio),
        Err(MediaLibError::MediaTypeMismatch { .. })
    ));
    assert!(matches!(
        validate_relative_path("Videos/abc", MediaType::Audio),
        Err(MediaLibError::MediaTypeMismatch { .. })
    ));
    assert!(validate_relative_path("Camera/", MediaType::Video).is_ok());
    assert!(validate_relative_path("Camera/", MediaType::Audio).is_err());
}

// -- albums and titles --

#[test]
fn album_names_need_no_extension() {
    assert!(validate_album_name("Holiday").is_ok());
    assert!(validate_album_name("").is_err());
    assert!(validate_album_name("a/b").is_err());
}

#[test]
fn title_forms_display_name() {
    assert_eq!(validate_title("song", "mp3").unwrap(), "song.mp3");
    assert!(validate_title("", "mp3").is_err());
    assert!(validate_title("so:ng", "mp3").is_err());
}

#[test]
fn split_extension_uses_last_dot() {
    assert_eq!(split_extension("a.b.mp3"), Some(("a.b", "mp3")));
    assert_eq!(split_extension("abc"), None);
    assert_eq!(split_extension("abc."), None);
}

#[test]
fn normalize_ignores_root_rules() {
    assert_eq!(normalize_relative_path("Storage/x").unwrap(), "Storage/x/");
    assert_eq!(root_of("Pictures/Holiday/"), "Pictures");
    assert!(normalize_relative_path("a//b").is_err());
}
