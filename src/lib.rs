//! # camgal
//!
//! Capture photos into a library and inspect the most recent one at eight
//! fixed quality levels.
//!
//! # Architecture
//!
//! ```text
//! capture   shot      →  library/IMG_….jpg      (untouched copy)
//! gallery   library   →  most recent photo
//!           photo     →  VariantSet (8 files in the work dir)
//!           selection →  DisplayView (path, size, ratio, zoom)
//! ```
//!
//! Derivation always produces the whole ladder or nothing. A [`derive::VariantSet`]
//! owns the files it points at: replacing or dropping it deletes them, so the
//! work directory only ever holds what is on screen.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ladder`] | The eight variant keys and their (compression, width fraction) table |
//! | [`imaging`] | Backend trait, dimension math, and the pure-Rust `image` backend |
//! | [`derive`] | Runs the ladder against one source photo, producing a `VariantSet` |
//! | [`view`] | Display path, size text, compression percentage, zoom bounds |
//! | [`state`] | Gallery screen state, single-flight load tickets, notices |
//! | [`gallery`] | Async driver: refresh, select, delete, save |
//! | [`media`] | Media store trait and the directory-backed library |
//! | [`capture`] | Shutter handling and hand-off to the media store |
//! | [`config`] | `camgal.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sequential Derivation
//!
//! The eight transforms run one after another in ladder order. Each step reads
//! the source photo, so the first failure stops the run and identifies the
//! failing key. Files already produced by the failed run are removed.
//!
//! ## One Load At A Time
//!
//! A refresh only starts when no other load is outstanding; a second refresh
//! reports `Busy` and derives nothing. Each load carries a ticket from a
//! generation counter that a delete advances, so a load running across a
//! delete is dropped on arrival (and its files with it).

pub mod capture;
pub mod config;
pub mod derive;
pub mod gallery;
pub mod imaging;
pub mod ladder;
pub mod media;
pub mod output;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
