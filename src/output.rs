//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Gallery
//!
//! ```text
//! IMG_20240501_101500.jpg
//!     Source: library/IMG_20240501_101500.jpg
//! 001 original   4000x3000  5.00 MB
//! 002 high       3200x2400  1.91 MB   38.1%
//! ...
//! 008 low4 *     1600x1200  97.66 KB   1.9%
//!
//! Low4
//!     Path: .camgal-work/3f1c….jpg
//!     1600x1200, 97.66 KB, 1.9% of original size
//!     Zoom: 0.25x – 3.00x
//! ```
//!
//! The `*` marks the selected variant.

use crate::derive::VariantSet;
use crate::ladder::VariantKey;
use crate::media::SourceImage;
use crate::state::{Notice, NoticeKind};
use crate::view::{DisplayView, compression_ratio, display_size};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Source header: library id with its path as context.
pub fn format_source(source: &SourceImage) -> Vec<String> {
    vec![
        source.id.clone(),
        format!("{}Source: {}", indent(1), source.path.display()),
    ]
}

/// `latest` command: source header, modification time, native dimensions.
pub fn format_latest(source: &SourceImage, width: u32, height: u32) -> Vec<String> {
    let modified: chrono::DateTime<chrono::Local> = source.modified_at.into();
    let mut lines = format_source(source);
    lines.push(format!(
        "{}Modified: {}",
        indent(1),
        modified.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(format!("{}{}x{}", indent(1), width, height));
    lines
}

/// One line per loaded variant, in selector strip order.
pub fn format_variant_table(set: &VariantSet, selected: VariantKey) -> Vec<String> {
    set.iter()
        .enumerate()
        .map(|(i, (key, variant))| {
            let name = if key == selected {
                format!("{key} *")
            } else {
                key.to_string()
            };
            let dims = format!("{}x{}", variant.width, variant.height);
            let ratio = compression_ratio(Some(set), key)
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_default();
            format!(
                "{} {:<10} {:<10} {:<10} {:>6}",
                format_index(i + 1),
                name,
                dims,
                display_size(variant.size),
                ratio
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

/// The preview block for the current selection.
pub fn format_display(view: &DisplayView) -> Vec<String> {
    let mut lines = vec![
        view.label.to_string(),
        format!("{}Path: {}", indent(1), view.path.display()),
    ];
    let mut detail = format!("{}{}x{}, {}", indent(1), view.width, view.height, view.size);
    if let Some(pct) = &view.compression {
        detail.push_str(&format!(", {pct}"));
    }
    lines.push(detail);
    if let Some(zoom) = view.zoom {
        lines.push(format!(
            "{}Zoom: {:.2}x – {:.2}x",
            indent(1),
            zoom.min_scale,
            zoom.max_scale
        ));
    }
    lines
}

/// A photo just written to the library.
pub fn format_saved(source: &SourceImage) -> Vec<String> {
    vec![format!("Saved {}", source.id), format!("{}Source: {}", indent(1), source.path.display())]
}

pub fn format_notices(notices: &[Notice]) -> Vec<String> {
    notices
        .iter()
        .map(|n| {
            let tag = match n.kind {
                NoticeKind::Info => "",
                NoticeKind::Error => "! ",
            };
            format!("{tag}{}: {}", n.title, n.message)
        })
        .collect()
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_latest(source: &SourceImage, width: u32, height: u32) {
    print_lines(&format_latest(source, width, height));
}

pub fn print_gallery(source: &SourceImage, set: &VariantSet, view: &DisplayView) {
    print_lines(&format_source(source));
    print_lines(&format_variant_table(set, view.key));
    println!();
    print_lines(&format_display(view));
}

pub fn print_saved(source: &SourceImage) {
    print_lines(&format_saved(source));
}

/// Notices go to stderr so stdout stays machine-readable with `--json`.
pub fn print_notices(notices: &[Notice]) {
    for line in format_notices(notices) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::Variant;
    use crate::view::{Viewport, ZoomBounds};
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn variant(size: u64, width: u32, height: u32) -> Variant {
        Variant {
            path: PathBuf::from(format!("/nonexistent/{width}-{size}.jpg")),
            size,
            width,
            height,
        }
    }

    fn set() -> VariantSet {
        VariantSet::adopt(BTreeMap::from([
            (VariantKey::Original, variant(5 * 1024 * 1024, 4000, 3000)),
            (VariantKey::High, variant(2_000_000, 3200, 2400)),
            (VariantKey::Low4, variant(100_000, 1600, 1200)),
        ]))
    }

    #[test]
    fn variant_table_marks_selection() {
        let lines = format_variant_table(&set(), VariantKey::High);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("001 original "));
        assert!(lines[0].contains("4000x3000"));
        assert!(lines[0].ends_with("5.00 MB"), "original has no ratio");
        assert!(lines[1].starts_with("002 high *"));
        assert!(lines[1].ends_with("38.1%"));
        assert!(lines[2].starts_with("003 low4 "));
    }

    #[test]
    fn display_block_includes_ratio_and_zoom() {
        let set = set();
        let viewport = Viewport {
            width: 400.0,
            height: 800.0,
        };
        let view = DisplayView::build(Some(&set), VariantKey::Low4, viewport).unwrap();
        let lines = format_display(&view);
        assert_eq!(lines[0], "Low4");
        assert_eq!(lines[2], "    1600x1200, 97.66 KB, 1.9% of original size");
        assert_eq!(lines[3], "    Zoom: 0.25x – 3.00x");
    }

    #[test]
    fn display_block_for_original_has_no_ratio() {
        let view = DisplayView {
            key: VariantKey::Original,
            label: "Original Quality",
            path: PathBuf::from("/w/a.jpg"),
            size: "1.00 MB".into(),
            compression: None,
            width: 10,
            height: 10,
            zoom: Some(ZoomBounds {
                min_scale: 1.0,
                max_scale: 3.0,
            }),
        };
        let lines = format_display(&view);
        assert_eq!(lines[2], "    10x10, 1.00 MB");
    }

    #[test]
    fn notices_render_title_and_message() {
        let lines = format_notices(&[Notice::SAVED, Notice::LOAD_FAILED]);
        assert_eq!(lines[0], "Success: Photo saved successfully!");
        assert!(lines[1].starts_with("! "));
    }

    #[test]
    fn source_lines() {
        let source = SourceImage {
            id: "IMG_0001.jpg".into(),
            path: PathBuf::from("library/IMG_0001.jpg"),
            modified_at: SystemTime::UNIX_EPOCH,
        };
        assert_eq!(
            format_source(&source),
            vec!["IMG_0001.jpg", "    Source: library/IMG_0001.jpg"]
        );
        assert_eq!(format_saved(&source)[0], "Saved IMG_0001.jpg");

        let latest = format_latest(&source, 640, 480);
        assert_eq!(latest.len(), 4);
        assert!(latest[2].starts_with("    Modified: "));
        assert_eq!(latest[3], "    640x480");
    }
}
