// This is free and unencumbered software released into the public domain.

use super::Value;
use std::sync::Arc;

/// Prefix of the per-view method channel name.
pub const CHANNEL_PREFIX: &str = "plugins/camera_kit_";

/// Name of the unsolicited barcode notification.
pub const ON_BARCODE_READ: &str = "onBarcodeRead";

/// The method channel name for the platform view `view_id`.
pub fn channel_name(view_id: i64) -> String {
    format!("{CHANNEL_PREFIX}{view_id}")
}

/// The sending half of a named method channel.
pub trait MethodChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Sends an unsolicited message to the remote side. Must be called from
    /// the UI thread.
    fn invoke_method(&self, method: &str, arguments: Value);
}

/// Opens method channels by name, e.g. over the host's binary messenger.
pub trait ChannelTransport: Send + Sync {
    fn open_channel(&self, name: &str) -> Arc<dyn MethodChannel>;
}
