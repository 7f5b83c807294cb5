//! Selection and display contract.
//!
//! Everything here is a pure function of `(VariantSet, selected key)` plus,
//! for zoom bounds, the viewport size. Nothing recomputes variants.

use crate::derive::VariantSet;
use crate::ladder::VariantKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum zoom factor of the preview.
pub const MAX_ZOOM: f64 = 3.0;

/// Location of the selected variant, if the set has it.
pub fn display_path(set: Option<&VariantSet>, selected: VariantKey) -> Option<&Path> {
    set?.get(selected).map(|v| v.path.as_path())
}

/// Human-readable byte size: `"512.00 KB"` below one MiB, `"1.23 MB"` from
/// one MiB up. Zero renders as empty.
pub fn display_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1.0 {
        format!("{mb:.2} MB")
    } else {
        format!("{kb:.2} KB")
    }
}

/// `100 × size(selected) / size(original)`.
///
/// `None` for the original itself, when either variant is missing, or when
/// the original is empty.
pub fn compression_ratio(set: Option<&VariantSet>, selected: VariantKey) -> Option<f64> {
    if selected == VariantKey::Original {
        return None;
    }
    let set = set?;
    let original = set.original()?;
    let current = set.get(selected)?;
    if original.size == 0 {
        return None;
    }
    Some(current.size as f64 / original.size as f64 * 100.0)
}

/// [`compression_ratio`] rendered to one decimal, e.g.
/// `"42.5% of original size"`.
pub fn compression_percentage(set: Option<&VariantSet>, selected: VariantKey) -> Option<String> {
    compression_ratio(set, selected).map(|p| format!("{p:.1}% of original size"))
}

/// Preview area size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Zoom range of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomBounds {
    /// Scale at which the whole image fits the viewport.
    pub min_scale: f64,
    pub max_scale: f64,
}

/// Fit-to-viewport minimum and fixed maximum zoom.
///
/// When the image is small enough that fitting needs more than
/// [`MAX_ZOOM`], the maximum is raised to the fit scale.
pub fn zoom_bounds(viewport: Viewport, width: u32, height: u32) -> Option<ZoomBounds> {
    if width == 0 || height == 0 {
        return None;
    }
    let min_scale = (viewport.width / width as f64).min(viewport.height / height as f64);
    Some(ZoomBounds {
        min_scale,
        max_scale: MAX_ZOOM.max(min_scale),
    })
}

/// Everything the preview area shows for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayView {
    pub key: VariantKey,
    pub label: &'static str,
    pub path: PathBuf,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomBounds>,
}

impl DisplayView {
    /// `None` while the set is missing or lacks `selected`.
    pub fn build(
        set: Option<&VariantSet>,
        selected: VariantKey,
        viewport: Viewport,
    ) -> Option<Self> {
        let variant = set?.get(selected)?;
        Some(Self {
            key: selected,
            label: selected.label(),
            path: variant.path.clone(),
            size: display_size(variant.size),
            compression: compression_percentage(set, selected),
            width: variant.width,
            height: variant.height,
            zoom: zoom_bounds(viewport, variant.width, variant.height),
        })
    }
}
