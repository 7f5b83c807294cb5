//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Width of a ladder entry: `original_width × fraction`, rounded, never 0.
///
/// # Examples
/// ```
/// # use camgal::imaging::scaled_width;
/// assert_eq!(scaled_width(4000, 0.8), 3200);
/// assert_eq!(scaled_width(4000, 0.4), 1600);
/// ```
pub fn scaled_width(original_width: u32, fraction: f64) -> u32 {
    ((original_width as f64 * fraction).round() as u32).max(1)
}

/// Height that preserves the source aspect ratio at `target_width`.
///
/// # Arguments
/// * `source` - Source dimensions (width, height)
/// * `target_width` - Requested output width
///
/// # Returns
/// * Output height, rounded, at least 1
pub fn height_for_width(source: (u32, u32), target_width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 1;
    }
    ((src_h as f64 * target_width as f64 / src_w as f64).round() as u32).max(1)
}

/// Output dimensions of a transform: native when `resize_width` is `None`.
pub fn transform_dimensions(source: (u32, u32), resize_width: Option<u32>) -> (u32, u32) {
    match resize_width {
        Some(w) => {
            let w = w.max(1);
            (w, height_for_width(source, w))
        }
        None => source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_width_ladder_fractions() {
        assert_eq!(scaled_width(4000, 0.8), 3200);
        assert_eq!(scaled_width(4000, 0.6), 2400);
        assert_eq!(scaled_width(4000, 0.4), 1600);
    }

    #[test]
    fn scaled_width_rounds_and_never_zero() {
        // 1001 * 0.4 = 400.4
        assert_eq!(scaled_width(1001, 0.4), 400);
        // 1006 * 0.6 = 603.6
        assert_eq!(scaled_width(1006, 0.6), 604);
        assert_eq!(scaled_width(1, 0.4), 1);
    }

    #[test]
    fn height_preserves_aspect() {
        assert_eq!(height_for_width((4000, 3000), 3200), 2400);
        assert_eq!(height_for_width((4000, 3000), 1600), 1200);
        assert_eq!(height_for_width((3000, 4000), 1200), 1600);
    }

    #[test]
    fn height_never_zero() {
        assert_eq!(height_for_width((4000, 10), 100), 1);
    }

    #[test]
    fn transform_without_resize_keeps_native() {
        assert_eq!(transform_dimensions((640, 480), None), (640, 480));
        assert_eq!(transform_dimensions((640, 480), Some(320)), (320, 240));
    }
}
