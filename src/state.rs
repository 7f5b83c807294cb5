//! Gallery screen state.
//!
//! [`GalleryState`] is a plain value: the current source photo, its
//! [`VariantSet`], the selected key, and pending notices. Every variant set
//! replaces the previous one wholesale; nothing mutates a set in place.
//!
//! ## Single-flight loads
//!
//! Loads are two-phase. [`GalleryState::begin_load`] hands out a
//! [`LoadTicket`] only when no load is outstanding, so at most one derivation
//! runs at a time. [`GalleryState::complete_load`] frees the slot and applies
//! the result only if its ticket still matches the generation counter. A
//! delete bumps the generation, so a load that was running across it is
//! dropped on arrival, which releases its derived files.
//!
//! ```text
//! begin_load   → ticket 1
//! begin_load   → None             (1 still in flight, no new derivation)
//! clear_deleted                   (generation moves past 1)
//! complete(1)  → Stale            (discarded, no notice)
//! begin_load   → ticket 3
//! complete(3)  → Applied          (selection reset to original)
//! ```

use crate::derive::VariantSet;
use crate::ladder::VariantKey;
use crate::media::SourceImage;
use crate::view::{self, DisplayView, Viewport};
use std::path::Path;
use tracing::{debug, warn};

/// Kind of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A user-visible notification (alert title + message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Notice {
    pub const LOAD_FAILED: Notice = Notice::error("Error", "Failed to load the last image.");
    pub const PERMISSION_REQUIRED: Notice = Notice::error(
        "Permission required",
        "Media library access is needed to view images.",
    );
    pub const DELETED: Notice = Notice::info("Deleted", "Image has been deleted successfully.");
    pub const DELETE_FAILED: Notice = Notice::error("Error", "Failed to delete the image.");
    pub const SAVED: Notice = Notice::info("Success", "Photo saved successfully!");
    pub const SAVE_FAILED: Notice =
        Notice::error("Error", "Failed to save picture. Please try again.");
    pub const CAPTURE_FAILED: Notice =
        Notice::error("Error", "Failed to take picture. Please try again.");

    const fn info(title: &'static str, message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Info,
            title,
            message,
        }
    }

    const fn error(title: &'static str, message: &'static str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title,
            message,
        }
    }
}

/// Proof that a load was started; redeemed by [`GalleryState::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket(u64);

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The new set is live.
    Applied,
    /// The load failed; a notice was raised.
    Failed,
    /// A delete superseded this load; the result was discarded.
    Stale,
    /// Another load was already in flight; nothing was started.
    Busy,
}

/// Why a load did not produce a variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    PermissionDenied,
    Other,
}

#[derive(Debug, Default)]
pub struct GalleryState {
    source: Option<SourceImage>,
    variants: Option<VariantSet>,
    selected: VariantKey,
    generation: u64,
    in_flight: Option<u64>,
    notices: Vec<Notice>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn variants(&self) -> Option<&VariantSet> {
        self.variants.as_ref()
    }

    pub fn selected(&self) -> VariantKey {
        self.selected
    }

    /// No photo is shown (never loaded, failed first load, or deleted).
    pub fn is_empty(&self) -> bool {
        self.variants.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a load. `None` while another load is outstanding.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if let Some(running) = self.in_flight {
            debug!(running, "Load already in flight");
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Some(LoadTicket(self.generation))
    }

    /// Apply the result of the load started with `ticket`.
    ///
    /// A failure raises exactly one notice. A failed first load leaves the
    /// state empty; a failed reload keeps the previous photo and selection.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<(SourceImage, VariantSet), LoadFailure>,
    ) -> LoadOutcome {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
        }
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "Discarding stale load result");
            return LoadOutcome::Stale;
        }

        match result {
            Ok((source, variants)) => {
                self.source = Some(source);
                // The previous set drops here and releases its files
                self.variants = Some(variants);
                self.selected = VariantKey::Original;
                LoadOutcome::Applied
            }
            Err(failure) => {
                warn!(?failure, "Gallery load failed");
                self.notices.push(match failure {
                    LoadFailure::PermissionDenied => Notice::PERMISSION_REQUIRED,
                    LoadFailure::Other => Notice::LOAD_FAILED,
                });
                LoadOutcome::Failed
            }
        }
    }

    /// Select a variant. Inert (returns `false`) if the key is not loaded.
    pub fn select(&mut self, key: VariantKey) -> bool {
        match &self.variants {
            Some(set) if set.contains(key) => {
                self.selected = key;
                true
            }
            _ => false,
        }
    }

    pub fn display_path(&self) -> Option<&Path> {
        view::display_path(self.variants.as_ref(), self.selected)
    }

    pub fn display(&self, viewport: Viewport) -> Option<DisplayView> {
        DisplayView::build(self.variants.as_ref(), self.selected, viewport)
    }

    /// Forget the photo after it was deleted from the library.
    ///
    /// Invalidates any in-flight load, since it may still be deriving from
    /// the deleted photo. The load keeps its slot until it completes.
    pub fn clear_deleted(&mut self) {
        self.generation += 1;
        self.source = None;
        self.variants = None;
        self.selected = VariantKey::Original;
    }

    /// Remove the variant set from the state without releasing its files.
    pub fn detach_variants(&mut self) -> Option<VariantSet> {
        self.selected = VariantKey::Original;
        self.variants.take()
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
