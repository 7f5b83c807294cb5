//! Capture screen: shutter press → full-resolution photo → media store.
//!
//! The photo is handed to [`MediaStore::save`] untouched: no resize, no
//! re-encode. A shutter press is ignored while the screen is in the
//! background, while the device is not ready, or while an earlier capture is
//! still being saved.
//!
//! The screen also carries the user's [`CaptureSettings`]: which camera faces
//! the subject, and the flash mode, cycled `off → on → auto → off`.

use crate::imaging::is_supported_photo;
use crate::media::{MediaError, MediaStore, PermissionStatus, SourceImage};
use crate::state::Notice;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera and media library permissions are required")]
    PermissionDenied,
    #[error("capture failed: {0}")]
    Device(String),
    #[error("failed to save photo: {0}")]
    Media(#[from] MediaError),
    #[error("capture task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Which camera is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

impl FlashMode {
    /// Next mode of the flash button: off → on → auto → off.
    pub fn next(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Auto,
            FlashMode::Auto => FlashMode::Off,
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlashMode::Off => "off",
            FlashMode::On => "on",
            FlashMode::Auto => "auto",
        })
    }
}

/// User-controlled camera options, applied to every shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSettings {
    pub facing: CameraFacing,
    pub flash: FlashMode,
}

impl CaptureSettings {
    pub fn toggle_facing(&mut self) {
        self.facing = self.facing.toggled();
    }

    pub fn cycle_flash(&mut self) {
        self.flash = self.flash.next();
    }
}

/// A source of full-resolution photos.
pub trait CaptureDevice: Sync {
    fn permission(&self) -> PermissionStatus;

    fn is_ready(&self) -> bool;

    /// Acquire one photo with `settings` and return its location.
    fn take_picture(&self, settings: CaptureSettings) -> Result<PathBuf, CaptureError>;
}

/// A "camera" whose shutter yields an existing image file.
///
/// Stands in for sensor hardware on the command line: `camgal capture shot.jpg`.
/// The file is already exposed, so facing and flash are only logged.
pub struct FileCamera {
    shot: PathBuf,
}

impl FileCamera {
    pub fn new(shot: impl Into<PathBuf>) -> Self {
        Self { shot: shot.into() }
    }
}

impl CaptureDevice for FileCamera {
    fn permission(&self) -> PermissionStatus {
        match std::fs::File::open(&self.shot) {
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => PermissionStatus::Denied,
            _ => PermissionStatus::Granted,
        }
    }

    fn is_ready(&self) -> bool {
        self.shot.is_file()
    }

    fn take_picture(&self, settings: CaptureSettings) -> Result<PathBuf, CaptureError> {
        if !is_supported_photo(&self.shot) {
            return Err(CaptureError::Device(format!(
                "not a supported photo: {}",
                self.shot.display()
            )));
        }
        debug!(facing = ?settings.facing, flash = %settings.flash, "Reading shot");
        Ok(self.shot.clone())
    }
}

/// Clears the in-progress flag when a capture ends, however it ends.
struct CapturingGuard<'a>(&'a AtomicBool);

impl Drop for CapturingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CaptureSession<D, M> {
    device: Arc<D>,
    store: Arc<M>,
    /// The screen is in the foreground.
    active: AtomicBool,
    capturing: AtomicBool,
    settings: Mutex<CaptureSettings>,
    notices: Mutex<Vec<Notice>>,
}

impl<D, M> CaptureSession<D, M>
where
    D: CaptureDevice + Send + 'static,
    M: MediaStore + Send + 'static,
{
    pub fn new(device: Arc<D>, store: Arc<M>) -> Self {
        Self {
            device,
            store,
            active: AtomicBool::new(true),
            capturing: AtomicBool::new(false),
            settings: Mutex::new(CaptureSettings::default()),
            notices: Mutex::new(Vec::new()),
        }
    }

    fn settings_lock(&self) -> MutexGuard<'_, CaptureSettings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notices_lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Both camera and media library access are granted.
    pub fn has_permissions(&self) -> bool {
        self.device.permission().is_granted() && self.store.permission().is_granted()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// The screen came to the foreground. Shots wait for the device to
    /// report ready again.
    pub fn focus(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// The screen went to the background; the shutter is disabled.
    pub fn blur(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn settings(&self) -> CaptureSettings {
        *self.settings_lock()
    }

    pub fn toggle_facing(&self) -> CameraFacing {
        let mut settings = self.settings_lock();
        settings.toggle_facing();
        settings.facing
    }

    pub fn cycle_flash(&self) -> FlashMode {
        let mut settings = self.settings_lock();
        settings.cycle_flash();
        settings.flash
    }

    /// Press the shutter.
    ///
    /// Returns `Ok(None)` when the press was ignored. Missing permissions are
    /// reported as an error without a notice; the screen shows the permission
    /// prompt instead.
    pub async fn shutter(&self) -> Result<Option<SourceImage>, CaptureError> {
        if !self.active.load(Ordering::Acquire) || !self.device.is_ready() {
            debug!("Shutter ignored: device not ready");
            return Ok(None);
        }
        if !self.has_permissions() {
            return Err(CaptureError::PermissionDenied);
        }
        if self
            .capturing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Shutter ignored: capture in progress");
            return Ok(None);
        }
        let _guard = CapturingGuard(&self.capturing);

        let settings = self.settings();
        let device = Arc::clone(&self.device);
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let photo = device.take_picture(settings)?;
            info!(path = %photo.display(), "Captured photo");
            Ok::<_, CaptureError>(store.save(&photo)?)
        })
        .await
        .map_err(CaptureError::from)
        .and_then(|r| r);

        let mut notices = self.notices_lock();
        match result {
            Ok(saved) => {
                notices.push(Notice::SAVED);
                Ok(Some(saved))
            }
            Err(e) => {
                error!(error = %e, "Error saving picture");
                notices.push(Notice::CAPTURE_FAILED);
                Err(e)
            }
        }
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices_lock())
    }
}
