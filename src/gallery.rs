//! Gallery screen driver.
//!
//! [`Gallery`] wires the [`MediaStore`], the derivation pipeline and the
//! [`GalleryState`] together. Blocking work (library listing, transforms,
//! file copies) runs on tokio's blocking pool; results are applied back to
//! the state under a short lock that is never held across an await.
//!
//! ## Actions
//!
//! | Action | Effect on state | Notice |
//! |---|---|---|
//! | [`refresh`](Gallery::refresh) | new set replaces old; selection → original; no-op while one runs | on failure only |
//! | [`select`](Gallery::select) | selection changes if the key is loaded | none |
//! | [`delete`](Gallery::delete) | cleared on success, untouched on failure | always |
//! | [`save`](Gallery::save) | untouched | always |
//!
//! Dropping the gallery tears the screen down and releases the current set's
//! derived files.

use crate::derive::{DerivationError, VariantSet, derive};
use crate::imaging::{ImageBackend, OutputFormat, StorageInfo};
use crate::ladder::VariantKey;
use crate::media::{MediaError, MediaStore, SourceImage};
use crate::state::{GalleryState, LoadFailure, LoadOutcome, Notice};
use crate::view::{DisplayView, Viewport};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("media library access denied")]
    PermissionDenied,
    #[error("no photo found in the library")]
    SourceUnavailable,
    #[error("no variant is selected")]
    NothingSelected,
    #[error("media library error: {0}")]
    Media(#[source] MediaError),
    #[error("derivation failed: {0}")]
    Derivation(#[from] DerivationError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<MediaError> for GalleryError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::PermissionDenied(_) => GalleryError::PermissionDenied,
            other => GalleryError::Media(other),
        }
    }
}

impl GalleryError {
    fn load_failure(&self) -> LoadFailure {
        match self {
            GalleryError::PermissionDenied => LoadFailure::PermissionDenied,
            _ => LoadFailure::Other,
        }
    }
}

/// Run `f` on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, GalleryError>
where
    F: FnOnce() -> Result<T, GalleryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

pub struct Gallery<B, M> {
    backend: Arc<B>,
    store: Arc<M>,
    format: OutputFormat,
    viewport: Viewport,
    state: Mutex<GalleryState>,
}

impl<B, M> Gallery<B, M>
where
    B: ImageBackend + StorageInfo + Send + 'static,
    M: MediaStore + Send + 'static,
{
    pub fn new(backend: Arc<B>, store: Arc<M>, format: OutputFormat, viewport: Viewport) -> Self {
        Self {
            backend,
            store,
            format,
            viewport,
            state: Mutex::new(GalleryState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GalleryState> {
        // State stays consistent across a panicking holder: every mutation
        // is a single assignment
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load the most recent photo and derive its variants.
    ///
    /// Returns `Ok(Busy)` without deriving anything while another refresh is
    /// running, and `Ok(Stale)` when a delete happened while this one was
    /// running; its result is discarded.
    pub async fn refresh(&self) -> Result<LoadOutcome, GalleryError> {
        let Some(ticket) = self.lock().begin_load() else {
            return Ok(LoadOutcome::Busy);
        };
        let result = self.fetch_and_derive().await;

        let mut state = self.lock();
        match result {
            Ok(loaded) => Ok(state.complete_load(ticket, Ok(loaded))),
            Err(e) => match state.complete_load(ticket, Err(e.load_failure())) {
                LoadOutcome::Stale => Ok(LoadOutcome::Stale),
                _ => Err(e),
            },
        }
    }

    async fn fetch_and_derive(&self) -> Result<(SourceImage, VariantSet), GalleryError> {
        let backend = Arc::clone(&self.backend);
        let store = Arc::clone(&self.store);
        let format = self.format;

        blocking(move || {
            if !store.permission().is_granted() {
                return Err(GalleryError::PermissionDenied);
            }
            let source = store
                .most_recent_photo()?
                .ok_or(GalleryError::SourceUnavailable)?;
            info!(id = %source.id, "Loading most recent photo");
            let variants = derive(&*backend, &*backend, &source.path, format)?;
            Ok((source, variants))
        })
        .await
    }

    /// Select a variant; inert if it is not loaded.
    pub fn select(&self, key: VariantKey) -> bool {
        self.lock().select(key)
    }

    pub fn selected(&self) -> VariantKey {
        self.lock().selected()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn source(&self) -> Option<SourceImage> {
        self.lock().source().cloned()
    }

    /// The preview of the current selection.
    pub fn display(&self) -> Option<DisplayView> {
        self.lock().display(self.viewport)
    }

    /// Read the state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&GalleryState) -> R) -> R {
        f(&self.lock())
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.lock().take_notices()
    }

    /// Take the variant set out of the gallery; the caller now owns its files.
    pub fn detach_variants(&self) -> Option<VariantSet> {
        self.lock().detach_variants()
    }

    /// Delete the shown photo from the library.
    pub async fn delete(&self) -> Result<(), GalleryError> {
        let id = self.lock().source().map(|s| s.id.clone());
        let result = match id {
            Some(id) => {
                let store = Arc::clone(&self.store);
                blocking(move || Ok(store.delete(&id)?)).await
            }
            None => Err(GalleryError::SourceUnavailable),
        };

        let mut state = self.lock();
        match result {
            Ok(()) => {
                state.clear_deleted();
                state.notify(Notice::DELETED);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Delete failed");
                state.notify(Notice::DELETE_FAILED);
                Err(e)
            }
        }
    }

    /// Save the selected variant to the library as a new photo.
    pub async fn save(&self) -> Result<SourceImage, GalleryError> {
        let path = self.lock().display_path().map(|p| p.to_path_buf());
        let result = match path {
            Some(path) => {
                let store = Arc::clone(&self.store);
                blocking(move || Ok(store.save(&path)?)).await
            }
            None => Err(GalleryError::NothingSelected),
        };

        let mut state = self.lock();
        match &result {
            Ok(saved) => {
                info!(id = %saved.id, "Saved selected variant");
                state.notify(Notice::SAVED);
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                state.notify(Notice::SAVE_FAILED);
            }
        }
        result
    }
}
