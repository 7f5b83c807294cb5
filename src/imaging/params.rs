//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the derivation pipeline (which decides what variants
//! to create) and the [`backend`](super::backend) (which does the pixel
//! work). A mock backend can stand in for the real one in tests.
//!
//! ## Types
//!
//! - [`Compression`]: Factor in `0.0..=1.0`, 1 = maximum fidelity. Clamped on construction.
//! - [`OutputFormat`]: Encoded format of a transform result.
//! - [`TransformParams`]: Full specification for one transform: source, optional resize width, compression, format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Compression factor for lossy encoding.
///
/// `1.0` keeps maximum fidelity (largest output), `0.0` compresses hardest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compression(f32);

impl Compression {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(1.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Map onto the JPEG encoder's 1-100 quality scale.
    pub fn jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Compression {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Encoded format of transform outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    /// Lossless; the compression factor is ignored.
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Parameters for one resize/recompress transform.
///
/// The output location is assigned by the backend, not the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub source: PathBuf,
    /// Target width; height follows the source aspect ratio. `None` keeps the
    /// native dimensions.
    pub resize_width: Option<u32>,
    pub compression: Compression,
    pub format: OutputFormat,
}
