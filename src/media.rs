//! Media store: the on-device photo library.
//!
//! [`MediaStore`] is the collaborator contract used by the capture and gallery
//! screens. [`LibraryStore`] implements it over a plain directory:
//!
//! ```text
//! library/
//! ├── IMG_20261019_101500.jpg     # saved by `capture`
//! ├── IMG_20261019_101500_1.jpg   # same second → numeric suffix
//! └── trips/
//!     └── beach.png               # nested files are part of the library too
//! ```
//!
//! Photo ids are paths relative to the library root, with `/` separators.
//! Only files with a decodable image extension count as photos.

use crate::imaging::is_supported_photo;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("media library access denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("photo not found: {0}")]
    NotFound(String),
    #[error("not a supported photo: {0}")]
    Unsupported(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("library walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Whether the library may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// A photo in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Stable identifier within the store.
    pub id: String,
    /// Resolvable location of the photo's bytes.
    pub path: PathBuf,
    pub modified_at: SystemTime,
}

/// On-device photo library.
pub trait MediaStore: Sync {
    /// Current access status. Every other call assumes `Granted`.
    fn permission(&self) -> PermissionStatus;

    /// The most recently modified photo, if any.
    fn most_recent_photo(&self) -> Result<Option<SourceImage>, MediaError>;

    /// Copy the photo at `path` into the library as a new entry.
    fn save(&self, path: &Path) -> Result<SourceImage, MediaError>;

    /// Remove a photo by id.
    fn delete(&self, id: &str) -> Result<(), MediaError>;
}

/// Directory-backed [`MediaStore`].
pub struct LibraryStore {
    root: PathBuf,
    /// How many of the newest photos a listing considers.
    recent_window: usize,
}

impl LibraryStore {
    pub fn new(root: impl Into<PathBuf>, recent_window: usize) -> Self {
        Self {
            root: root.into(),
            recent_window: recent_window.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Newest photos first, at most `recent_window` of them.
    pub fn recent_photos(&self) -> Result<Vec<SourceImage>, MediaError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut photos = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_supported_photo(entry.path()) {
                continue;
            }
            let modified_at = entry.metadata()?.modified()?;
            photos.push(SourceImage {
                id: self.id_for(entry.path()),
                path: entry.path().to_path_buf(),
                modified_at,
            });
        }

        // Newest first; ties broken by id so listings are stable
        photos.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        photos.truncate(self.recent_window);
        Ok(photos)
    }

    fn id_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Resolve an id to a path inside the root, rejecting escapes.
    fn path_for(&self, id: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(id);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if id.is_empty() || escapes {
            return Err(MediaError::NotFound(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// `IMG_<timestamp>.<ext>`, suffixed when the name is taken.
    fn next_photo_path(&self, extension: &str) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let base = format!("IMG_{timestamp}");
        let mut candidate = self.root.join(format!("{base}.{extension}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.root.join(format!("{base}_{n}.{extension}"));
            n += 1;
        }
        candidate
    }
}

fn map_permission(root: &Path, e: std::io::Error) -> MediaError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        MediaError::PermissionDenied(root.to_path_buf())
    } else {
        MediaError::Io(e)
    }
}

impl MediaStore for LibraryStore {
    /// Read access to the library. A read-only library can still be browsed;
    /// writes that the filesystem refuses fail with `PermissionDenied` on
    /// their own.
    fn permission(&self) -> PermissionStatus {
        // A missing root is created on first save
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => match std::fs::read_dir(&self.root) {
                Ok(_) => PermissionStatus::Granted,
                Err(_) => PermissionStatus::Denied,
            },
            Ok(_) => PermissionStatus::Denied,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PermissionStatus::Granted,
            Err(_) => PermissionStatus::Denied,
        }
    }

    fn most_recent_photo(&self) -> Result<Option<SourceImage>, MediaError> {
        let latest = self.recent_photos()?.into_iter().next();
        debug!(id = ?latest.as_ref().map(|p| &p.id), "Most recent photo");
        Ok(latest)
    }

    fn save(&self, path: &Path) -> Result<SourceImage, MediaError> {
        if !is_supported_photo(path) {
            return Err(MediaError::Unsupported(path.to_path_buf()));
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg")
            .to_lowercase();

        std::fs::create_dir_all(&self.root).map_err(|e| map_permission(&self.root, e))?;
        let target = self.next_photo_path(&extension);
        std::fs::copy(path, &target).map_err(|e| map_permission(&self.root, e))?;
        let modified_at = std::fs::metadata(&target)?.modified()?;

        let saved = SourceImage {
            id: self.id_for(&target),
            path: target,
            modified_at,
        };
        info!(id = %saved.id, from = %path.display(), "Saved photo to library");
        Ok(saved)
    }

    fn delete(&self, id: &str) -> Result<(), MediaError> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(MediaError::NotFound(id.to_string()));
        }
        std::fs::remove_file(&path).map_err(|e| map_permission(&self.root, e))?;
        info!(id, "Deleted photo from library");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, set_mtime};

    #[test]
    fn empty_or_missing_library_has_no_recent_photo() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LibraryStore::new(tmp.path().join("missing"), 20);
        assert!(store.most_recent_photo().unwrap().is_none());
        assert!(store.permission().is_granted());
    }

    #[test]
    fn most_recent_is_newest_by_mtime() {
        let tmp = tempfile::TempDir::new().unwrap();
        let old = tmp.path().join("old.jpg");
        let new = tmp.path().join("nested/new.jpg");
        std::fs::create_dir_all(new.parent().unwrap()).unwrap();
        create_test_jpeg(&old, 8, 8);
        create_test_jpeg(&new, 8, 8);
        set_mtime(&old, 1_000);
        set_mtime(&new, 2_000);

        let store = LibraryStore::new(tmp.path(), 20);
        let latest = store.most_recent_photo().unwrap().unwrap();
        assert_eq!(latest.id, "nested/new.jpg");
        assert_eq!(latest.path, new);
    }

    #[test]
    fn non_photos_are_ignored() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "hi").unwrap();
        let store = LibraryStore::new(tmp.path(), 20);
        assert!(store.most_recent_photo().unwrap().is_none());
    }

    #[test]
    fn recent_window_limits_listing() {
        let tmp = tempfile::TempDir::new().unwrap();
        for i in 0..5 {
            let path = tmp.path().join(format!("{i}.jpg"));
            create_test_jpeg(&path, 4, 4);
            set_mtime(&path, 1_000 + i);
        }

        let store = LibraryStore::new(tmp.path(), 3);
        let ids: Vec<String> = store
            .recent_photos()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["4.jpg", "3.jpg", "2.jpg"]);
    }

    #[test]
    fn save_copies_into_library_with_timestamp_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let shot = tmp.path().join("shot.JPG");
        create_test_jpeg(&shot, 16, 12);

        let store = LibraryStore::new(tmp.path().join("library"), 20);
        let first = store.save(&shot).unwrap();
        let second = store.save(&shot).unwrap();

        assert!(first.id.starts_with("IMG_") && first.id.ends_with(".jpg"));
        assert_ne!(first.id, second.id);
        assert!(first.path.exists() && second.path.exists());
        assert!(shot.exists(), "source is copied, not moved");
    }

    #[test]
    fn save_rejects_non_photo() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = tmp.path().join("doc.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();

        let store = LibraryStore::new(tmp.path().join("library"), 20);
        assert!(matches!(store.save(&doc), Err(MediaError::Unsupported(_))));
    }

    #[test]
    fn delete_removes_photo() {
        let tmp = tempfile::TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("a.jpg"), 4, 4);

        let store = LibraryStore::new(tmp.path(), 20);
        store.delete("a.jpg").unwrap();
        assert!(store.most_recent_photo().unwrap().is_none());
        assert!(matches!(store.delete("a.jpg"), Err(MediaError::NotFound(_))));
    }

    #[test]
    fn delete_rejects_paths_outside_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let outside = tmp.path().join("outside.jpg");
        create_test_jpeg(&outside, 4, 4);

        let store = LibraryStore::new(tmp.path().join("library"), 20);
        assert!(matches!(
            store.delete("../outside.jpg"),
            Err(MediaError::NotFound(_))
        ));
        assert!(outside.exists());
    }

    #[test]
    fn file_as_root_is_denied() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();
        let store = LibraryStore::new(&file, 20);
        assert_eq!(store.permission(), PermissionStatus::Denied);
    }

    #[test]
    fn read_only_library_can_still_be_browsed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("library");
        std::fs::create_dir_all(&root).unwrap();
        create_test_jpeg(&root.join("a.jpg"), 4, 4);

        let original = std::fs::metadata(&root).unwrap().permissions();
        let mut read_only = original.clone();
        read_only.set_readonly(true);
        std::fs::set_permissions(&root, read_only).unwrap();

        let store = LibraryStore::new(&root, 20);
        let granted = store.permission();
        let latest = store.most_recent_photo().map(|p| p.map(|p| p.id));

        std::fs::set_permissions(&root, original).unwrap();

        assert_eq!(granted, PermissionStatus::Granted);
        assert_eq!(latest.unwrap().as_deref(), Some("a.jpg"));
    }
}
