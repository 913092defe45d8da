//! In-memory registry of open asset handles.
//!
//! Descriptors are synthetic, issued from a counter, and map to the real
//! `File` the tracker keeps alive until the handle is closed or taken.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};

use medialib_core::{MediaLibError, MediaUri};
use parking_lot::Mutex;

/// Access an asset was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenStatus {
    Read,
    Write,
    ReadWrite,
}

impl OpenStatus {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// A parsed open mode string: `r`, `w`, `rw`, `wt`, `wa`, `rwt` or `rwa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub truncate: bool,
    pub append: bool,
}

impl OpenMode {
    pub fn status(&self) -> OpenStatus {
        match (self.read, self.write) {
            (true, true) => OpenStatus::ReadWrite,
            (false, true) => OpenStatus::Write,
            _ => OpenStatus::Read,
        }
    }

    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .truncate(self.truncate);
        options
    }
}

impl FromStr for OpenMode {
    type Err = MediaLibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (read, write, truncate, append) = match s {
            "r" => (true, false, false, false),
            "w" => (false, true, false, false),
            "rw" => (true, true, false, false),
            "wt" => (false, true, true, false),
            "wa" => (false, true, false, true),
            "rwt" => (true, true, true, false),
            "rwa" => (true, true, false, true),
            _ => return Err(MediaLibError::InvalidMode(s.to_string())),
        };
        Ok(Self {
            read,
            write,
            truncate,
            append,
        })
    }
}

struct OpenHandle {
    status: OpenStatus,
    file: Option<File>,
}

#[derive(Default)]
pub struct OpenHandleTracker {
    entries: Mutex<HashMap<(MediaUri, i32), OpenHandle>>,
    next_fd: AtomicI32,
}

impl OpenHandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an opened file and return its descriptor.
    pub fn register(&self, asset: MediaUri, status: OpenStatus, file: File) -> i32 {
        let fd = self.next_fd.fetch_add(1, Ordering::Relaxed) + 1;
        self.set_open_status(asset, fd, status, Some(file));
        fd
    }

    /// Record `status` for `(asset, fd)`, replacing any previous entry.
    pub fn set_open_status(&self, asset: MediaUri, fd: i32, status: OpenStatus, file: Option<File>) {
        let previous = self
            .entries
            .lock()
            .insert((asset, fd), OpenHandle { status, file });
        drop(previous);
    }

    pub fn get_open_status(&self, asset: MediaUri, fd: i32) -> Option<OpenStatus> {
        self.entries.lock().get(&(asset, fd)).map(|h| h.status)
    }

    /// Forget one descriptor. The file is closed after the lock is released.
    pub fn remove_open_status(&self, asset: MediaUri, fd: i32) -> Option<OpenStatus> {
        let removed = self.entries.lock().remove(&(asset, fd));
        removed.map(|handle| handle.status)
    }

    /// Forget every descriptor of `asset`, returning their statuses.
    pub fn remove_all(&self, asset: MediaUri) -> Vec<OpenStatus> {
        let removed: Vec<OpenHandle> = {
            let mut entries = self.entries.lock();
            let keys: Vec<_> = entries.keys().filter(|(a, _)| *a == asset).copied().collect();
            keys.iter().filter_map(|k| entries.remove(k)).collect()
        };
        removed.into_iter().map(|h| h.status).collect()
    }

    /// Hand the open file of `fd` to the caller. The status entry stays
    /// until the asset is closed.
    pub fn take_file(&self, fd: i32) -> Option<File> {
        self.entries
            .lock()
            .iter_mut()
            .find(|((_, f), _)| *f == fd)
            .and_then(|(_, handle)| handle.file.take())
    }

    pub fn is_open(&self, asset: MediaUri) -> bool {
        self.entries.lock().keys().any(|(a, _)| *a == asset)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every handle. Returns how many were open.
    pub fn clear(&self) -> usize {
        let drained: Vec<OpenHandle> = self.entries.lock().drain().map(|(_, h)| h).collect();
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medialib_core::OperationObject;

    fn uri(id: i64) -> MediaUri {
        MediaUri::new(OperationObject::Audio, id)
    }

    fn scratch_file(dir: &tempfile::TempDir, name: &str) -> File {
        File::create(dir.path().join(name)).unwrap()
    }

    #[test]
    fn all_modes_parse() {
        for (mode, status) in [
            ("r", OpenStatus::Read),
            ("w", OpenStatus::Write),
            ("rw", OpenStatus::ReadWrite),
            ("wt", OpenStatus::Write),
            ("wa", OpenStatus::Write),
            ("rwt", OpenStatus::ReadWrite),
            ("rwa", OpenStatus::ReadWrite),
        ] {
            assert_eq!(mode.parse::<OpenMode>().unwrap().status(), status, "{mode}");
        }
    }

    #[test]
    fn bad_modes_are_rejected() {
        for mode in ["", "m", "x", "rr", "R", "tw"] {
            assert!(matches!(
                mode.parse::<OpenMode>(),
                Err(MediaLibError::InvalidMode(_))
            ));
        }
    }

    #[test]
    fn register_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = OpenHandleTracker::new();
        let fd = tracker.register(uri(1), OpenStatus::Write, scratch_file(&dir, "a"));
        assert_eq!(tracker.get_open_status(uri(1), fd), Some(OpenStatus::Write));
        assert_eq!(tracker.get_open_status(uri(2), fd), None);
        assert_eq!(tracker.remove_open_status(uri(1), fd), Some(OpenStatus::Write));
        assert_eq!(tracker.remove_open_status(uri(1), fd), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn descriptors_are_unique_and_remove_all_is_per_asset() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = OpenHandleTracker::new();
        let a = tracker.register(uri(1), OpenStatus::Read, scratch_file(&dir, "a"));
        let b = tracker.register(uri(1), OpenStatus::ReadWrite, scratch_file(&dir, "b"));
        let c = tracker.register(uri(2), OpenStatus::Read, scratch_file(&dir, "c"));
        assert!(a != b && b != c && a != c);

        let mut removed = tracker.remove_all(uri(1));
        removed.sort_by_key(|s| s.is_write());
        assert_eq!(removed, vec![OpenStatus::Read, OpenStatus::ReadWrite]);
        assert!(!tracker.is_open(uri(1)));
        assert!(tracker.is_open(uri(2)));
        assert_eq!(tracker.clear(), 1);
    }

    #[test]
    fn take_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = OpenHandleTracker::new();
        let fd = tracker.register(uri(1), OpenStatus::Read, scratch_file(&dir, "a"));
        assert!(tracker.take_file(fd).is_some());
        assert!(tracker.take_file(fd).is_none());
        assert_eq!(tracker.get_open_status(uri(1), fd), Some(OpenStatus::Read));
    }
}
