//! Shared test utilities for the camgal test suite.
//!
//! Provides synthetic photo writers and library setup helpers so tests can
//! exercise the real backend and store on tiny images.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let (tmp, store) = library_with_photo(64, 48);
//! let latest = store.most_recent_photo().unwrap().unwrap();
//! assert_eq!(latest.id, "IMG_0001.jpg");
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::media::LibraryStore;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a textured JPEG at maximum quality.
///
/// The pattern mixes gradients with a cheap hash so that lower encoder
/// qualities produce visibly smaller files.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let noise = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)).wrapping_mul(2_654_435_761) >> 24;
        image::Rgb([
            (x % 256) as u8,
            (y % 256) as u8,
            (noise & 0xff) as u8,
        ])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 100)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Set a file's modification time to `secs` after the Unix epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

// =========================================================================
// Library fixtures
// =========================================================================

/// A temp library containing one photo, `IMG_0001.jpg`.
///
/// The store root is `<tmp>/library`; `<tmp>/work` is free for a backend.
pub fn library_with_photo(width: u32, height: u32) -> (TempDir, LibraryStore) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("library");
    std::fs::create_dir_all(&root).unwrap();
    create_test_jpeg(&root.join("IMG_0001.jpg"), width, height);
    let store = LibraryStore::new(root, 20);
    (tmp, store)
}

/// Number of files directly inside `dir` (0 if it does not exist).
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.flatten().filter(|e| e.path().is_file()).count())
        .unwrap_or(0)
}
