// This is free and unencumbered software released into the public domain.

use super::{BridgeError, PendingResult, Reply, Value, bridge::Shared};
use bytes::Bytes;
use std::sync::Arc;

/// A barcode decoded by the native view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Barcode {
    pub raw_value: Option<String>,
    /// Format identifier as reported by the decoder (see `BarcodeFormats`).
    pub format: i32,
    pub raw_bytes: Option<Bytes>,
}

impl Barcode {
    pub fn new(raw_value: impl Into<String>, format: i32, raw_bytes: impl Into<Bytes>) -> Self {
        Self {
            raw_value: Some(raw_value.into()),
            format,
            raw_bytes: Some(raw_bytes.into()),
        }
    }

    /// The `onBarcodeRead` payload: always exactly `code`, `type` and
    /// `rawBytes`, with absent parts sent as null.
    pub fn to_value(&self) -> Value {
        [
            ("code", Value::from(self.raw_value.clone())),
            ("type", Value::from(self.format)),
            ("rawBytes", Value::from(self.raw_bytes.clone())),
        ]
        .into_iter()
        .collect()
    }
}

/// Capture request handed to [`NativeCameraView::take_picture`].
///
/// The view answers by passing it back through [`CameraEventListener`].
/// A request dropped unanswered fails the call with `pictureAbandoned`.
///
/// [`NativeCameraView::take_picture`]: super::NativeCameraView::take_picture
pub struct PictureRequest {
    result: Option<PendingResult>,
    shared: Arc<Shared>,
}

impl core::fmt::Debug for PictureRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PictureRequest")
            .field("answered", &self.result.is_none())
            .finish()
    }
}

impl PictureRequest {
    pub(crate) fn new(result: PendingResult, shared: Arc<Shared>) -> Self {
        Self {
            result: Some(result),
            shared,
        }
    }

    fn finish(&mut self, reply: Reply) {
        if let Some(result) = self.result.take() {
            self.shared.finish_picture(result, reply);
        }
    }
}

impl Drop for PictureRequest {
    fn drop(&mut self) {
        if self.result.is_some() {
            crate::warn!(target: "asimov_camera_bridge", "capture request dropped unanswered");
            self.finish((&BridgeError::PictureAbandoned).into());
        }
    }
}

/// Callbacks the native camera view uses to report back to the bridge.
///
/// May be invoked from any thread.
pub trait CameraEventListener: Send + Sync {
    fn on_barcode_read(&self, barcode: Barcode);

    fn on_take_picture(&self, request: PictureRequest, file_path: String);

    fn on_take_picture_failed(&self, request: PictureRequest, error_code: String, error_message: String);
}

impl core::fmt::Debug for dyn CameraEventListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CameraEventListener")
    }
}

/// The bridge's side of the listener contract.
pub(crate) struct BridgeListener {
    pub(crate) shared: Arc<Shared>,
}

impl CameraEventListener for BridgeListener {
    fn on_barcode_read(&self, barcode: Barcode) {
        crate::trace!(target: "asimov_camera_bridge", format = barcode.format, "barcode read");
        self.shared.notify_barcode(barcode.to_value());
    }

    fn on_take_picture(&self, mut request: PictureRequest, file_path: String) {
        if file_path.is_empty() {
            request.finish((&BridgeError::EmptyFilePath).into());
            return;
        }
        crate::debug!(target: "asimov_camera_bridge", %file_path, "picture taken");
        request.finish(Reply::Success(file_path.into()));
    }

    fn on_take_picture_failed(
        &self,
        mut request: PictureRequest,
        error_code: String,
        error_message: String,
    ) {
        crate::debug!(target: "asimov_camera_bridge", %error_code, "picture failed");
        request.finish(Reply::Error {
            code: error_code,
            message: Some(error_message),
            details: Value::Null,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barcode_payload_has_three_keys() {
        let barcode = Barcode::new("ABC123", 32, Bytes::from_static(&[1, 2, 3]));
        let value = barcode.to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["code"], Value::from("ABC123"));
        assert_eq!(map["type"], Value::Int(32));
        assert_eq!(map["rawBytes"], Value::Bytes(Bytes::from_static(&[1, 2, 3])));
    }

    #[test]
    fn absent_parts_are_null() {
        let barcode = Barcode {
            raw_value: None,
            format: 256,
            raw_bytes: None,
        };
        let value = barcode.to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert!(map["code"].is_null());
        assert!(map["rawBytes"].is_null());
    }
}
