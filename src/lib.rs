// This is free and unencumbered software released into the public domain.

//! Method-channel bridge between a cross-platform UI framework and a native
//! camera view with barcode scanning.
//!
//! The bridge ([`shared::CameraKitBridge`]) receives named calls on the
//! `plugins/camera_kit_<viewId>` channel, forwards them to a
//! [`shared::NativeCameraView`], and reports the view's asynchronous events
//! back through a [`shared::UiExecutor`].

extern crate alloc;

pub mod cli;
pub mod shared;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use asimov_module::tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! ignore_log {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {ignore_log as debug, ignore_log as trace, ignore_log as warn};
