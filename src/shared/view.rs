// This is free and unencumbered software released into the public domain.

use super::{CameraEventListener, CameraOptions, FlashMode, PictureRequest};
use std::sync::Arc;

/// Handle through which a native view reports events to its bridge.
pub type ListenerRef = Arc<dyn CameraEventListener>;

/// The platform camera component a bridge drives.
///
/// Implementations own the camera hardware, the preview surface and the
/// barcode decoder. Every method is called on the UI thread and must not
/// block; results come back later through the [`CameraEventListener`] the
/// view was constructed with.
pub trait NativeCameraView: dogma::Named + Send {
    /// What the host embeds to show the preview.
    type Surface;

    fn init_camera(&mut self, options: &CameraOptions);

    fn resume_camera(&mut self);

    fn pause_camera(&mut self);

    /// Starts a still capture. The view must eventually hand `request` back
    /// via [`CameraEventListener::on_take_picture`] or
    /// [`CameraEventListener::on_take_picture_failed`].
    fn take_picture(&mut self, request: PictureRequest);

    fn change_flash_mode(&mut self, mode: FlashMode);

    /// Shows or hides the preview without tearing the session down.
    fn set_camera_visible(&mut self, visible: bool);

    /// Releases the camera. Called at most once.
    fn dispose(&mut self);

    fn surface(&self) -> &Self::Surface;
}
