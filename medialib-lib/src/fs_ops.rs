//! Physical file mutations. Every failure becomes `MediaLibError::Fs` with
//! the OS error preserved.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use medialib_core::MediaLibError;

/// Create an empty file, failing if anything already exists at `path`.
pub fn create_empty_file(path: &Path) -> Result<(), MediaLibError> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
        .map_err(|e| MediaLibError::fs(path, e))
}

/// Create `dir` and its parents. Succeeds if it already exists.
pub fn ensure_directory(dir: &Path) -> Result<(), MediaLibError> {
    fs::create_dir_all(dir).map_err(|e| MediaLibError::fs(dir, e))
}

pub fn delete_file(path: &Path) -> Result<(), MediaLibError> {
    fs::remove_file(path).map_err(|e| MediaLibError::fs(path, e))
}

/// Move `src` to `dst`. Both must lie inside `boundary` and `dst` must not
/// exist yet.
pub fn move_file(src: &Path, dst: &Path, boundary: &Path) -> Result<(), MediaLibError> {
    for path in [src, dst] {
        if !is_within(path, boundary) {
            return Err(MediaLibError::invalid_path(format!(
                "{} is outside {}",
                path.display(),
                boundary.display()
            )));
        }
    }
    if dst.symlink_metadata().is_ok() {
        return Err(MediaLibError::fs(
            dst,
            io::Error::from(io::ErrorKind::AlreadyExists),
        ));
    }
    if let Some(parent) = dst.parent() {
        ensure_directory(parent)?;
    }
    fs::rename(src, dst).map_err(|e| MediaLibError::fs(src, e))
}

/// Remove empty directories from `start` upward, stopping before `stop`.
///
/// `start` must be `stop` itself or lie below it. Returns how many
/// directories were removed.
pub fn delete_empty_dirs_upward(start: &Path, stop: &Path) -> Result<usize, MediaLibError> {
    if !is_within(start, stop) {
        return Err(MediaLibError::invalid_path(format!(
            "{} is outside {}",
            start.display(),
            stop.display()
        )));
    }
    let stop = normalize(stop);
    let mut removed = 0;
    let mut current = normalize(start);
    while current != stop {
        match fs::remove_dir(&current) {
            Ok(()) => removed += 1,
            // Non-empty or already gone: nothing more to prune.
            Err(e)
                if e.kind() == io::ErrorKind::DirectoryNotEmpty
                    || e.kind() == io::ErrorKind::NotFound =>
            {
                break;
            }
            Err(e) => return Err(MediaLibError::fs(&current, e)),
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(removed)
}

/// Lexical containment check; `..` components are resolved without
/// touching the filesystem.
pub fn is_within(path: &Path, boundary: &Path) -> bool {
    normalize(path).starts_with(normalize(boundary))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_empty_file_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        create_empty_file(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        let err = create_empty_file(&path).unwrap_err();
        assert!(matches!(err, MediaLibError::Fs { .. }));
        assert!(err.os_code().is_some());
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Audio/0");
        ensure_directory(&nested).unwrap();
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn move_respects_boundary_and_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let src = root.join("Audio/0/1.mp3");
        ensure_directory(src.parent().unwrap()).unwrap();
        create_empty_file(&src).unwrap();

        let outside = root.join("../escape.mp3");
        assert!(matches!(
            move_file(&src, &outside, root),
            Err(MediaLibError::InvalidPath(_))
        ));

        let taken = root.join("Audio/0/2.mp3");
        create_empty_file(&taken).unwrap();
        assert!(matches!(
            move_file(&src, &taken, root),
            Err(MediaLibError::Fs { .. })
        ));

        let dst = root.join("Audio/0/1.flac");
        move_file(&src, &dst, root).unwrap();
        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[test]
    fn delete_missing_file_is_fs_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = delete_file(&dir.path().join("gone.mp3")).unwrap_err();
        assert_eq!(err.code(), medialib_core::error::E_HAS_FS_ERROR);
    }

    #[test]
    fn prune_stops_at_boundary_and_non_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Audio");
        let deep = root.join("0/a/b");
        ensure_directory(&deep).unwrap();
        create_empty_file(&root.join("0/keep.txt")).unwrap();

        let removed = delete_empty_dirs_upward(&deep, &root).unwrap();
        assert_eq!(removed, 2);
        assert!(root.join("0").is_dir());
        assert!(root.is_dir());

        fs::remove_file(root.join("0/keep.txt")).unwrap();
        assert_eq!(delete_empty_dirs_upward(&root.join("0"), &root).unwrap(), 1);
        assert!(root.is_dir());
    }

    #[test]
    fn containment_is_lexical() {
        assert!(is_within(Path::new("/a/b/c"), Path::new("/a/b")));
        assert!(!is_within(Path::new("/a/b/../../x"), Path::new("/a/b")));
        assert!(!is_within(Path::new("/a/bc"), Path::new("/a/b")));
    }
}
