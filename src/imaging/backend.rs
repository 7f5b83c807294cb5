//! Image processing backend traits and shared types.
//!
//! Two collaborators feed the derivation pipeline:
//!
//! - [`ImageBackend`]: the Transform. Given a source and a
//!   [`TransformParams`], it writes a new image at a location of its own
//!   choosing and reports the final pixel dimensions.
//! - [`StorageInfo`]: byte size of a resource at a location.
//!
//! The production implementation of both is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::TransformParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of a transform: where the new image lives and its final size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Resize/recompress transform.
///
/// Treated as deterministic for a fixed input tuple. Every call materializes a
/// new file; the caller owns it afterwards.
pub trait ImageBackend: Sync {
    /// Get image dimensions without transforming.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize (optionally) and re-encode `params.source`.
    fn transform(&self, params: &TransformParams) -> Result<Transformed, BackendError>;
}

/// Byte-size lookup for resources produced by a transform.
pub trait StorageInfo: Sync {
    fn size(&self, path: &Path) -> Result<u64, BackendError>;
}
