//! Image processing: the Transform and StorageInfo collaborators.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → JPEG/PNG** | Lanczos3 + `image` encoders |
//! | **Size lookup** | `std::fs::metadata` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a transform
//! - **Backend**: [`ImageBackend`] / [`StorageInfo`] traits + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, StorageInfo, Transformed};
pub use calculations::{height_for_width, scaled_width, transform_dimensions};
pub use params::{Compression, OutputFormat, TransformParams};
pub use rust_backend::{RustBackend, is_supported_photo, supported_input_extensions};
