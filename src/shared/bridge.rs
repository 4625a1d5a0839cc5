// This is free and unencumbered software released into the public domain.

use super::{
    BridgeError, CAMERA_PERMISSION, CameraEventListener, ChannelTransport, Command,
    ListenerRef, Method, MethodChannel, NativeCameraView, ON_BARCODE_READ, PendingResult,
    PermissionHost, PermissionState, PictureRequest, REQUEST_CAMERA_PERMISSION, Reply, UiExecutor,
    Value, channel_name, listener::BridgeListener,
};
use alloc::borrow::Cow;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Host services a bridge is created with.
#[derive(Clone)]
pub struct BridgeContext {
    pub transport: Arc<dyn ChannelTransport>,
    pub executor: Arc<dyn UiExecutor>,
    pub permissions: Arc<dyn PermissionHost>,
}

/// State reachable from listener callbacks on any thread.
pub(crate) struct Shared {
    channel: Arc<dyn MethodChannel>,
    executor: Arc<dyn UiExecutor>,
    picture_in_progress: AtomicBool,
    permission_pending: AtomicBool,
}

impl Shared {
    pub(crate) fn notify_barcode(&self, payload: Value) {
        let channel = Arc::clone(&self.channel);
        self.executor.execute(Box::new(move || {
            channel.invoke_method(ON_BARCODE_READ, payload);
        }));
    }

    pub(crate) fn finish_picture(&self, result: PendingResult, reply: Reply) {
        self.picture_in_progress.store(false, Ordering::SeqCst);
        self.executor.execute(Box::new(move || result.reply(reply)));
    }

    fn finish_permission(&self, result: PendingResult, granted: bool) {
        self.permission_pending.store(false, Ordering::SeqCst);
        self.executor.execute(Box::new(move || result.success(granted)));
    }
}

/// The in-flight permission prompt. Answers `false` if the host drops it.
struct PermissionTicket {
    result: Option<PendingResult>,
    shared: Arc<Shared>,
}

impl PermissionTicket {
    fn finish(&mut self, granted: bool) {
        if let Some(result) = self.result.take() {
            self.shared.finish_permission(result, granted);
        }
    }
}

impl Drop for PermissionTicket {
    fn drop(&mut self) {
        self.finish(false);
    }
}

/// Bridges one platform view's method channel to its native camera view.
///
/// Calls arrive through [`dispatch`](Self::dispatch) on the UI thread. The
/// native view is created with the bridge and released by
/// [`dispose`](Self::dispose) or on drop; it is never recreated.
pub struct CameraKitBridge<V: NativeCameraView> {
    view_id: i64,
    channel_name: String,
    shared: Arc<Shared>,
    permissions: Arc<dyn PermissionHost>,
    view: Option<V>,
}

impl<V: NativeCameraView> core::fmt::Debug for CameraKitBridge<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CameraKitBridge")
            .field("view_id", &self.view_id)
            .field("channel_name", &self.channel_name)
            .field("view", &self.view.as_ref().map(|v| v.name()))
            .finish()
    }
}

impl<V: NativeCameraView> CameraKitBridge<V> {
    /// Opens the `plugins/camera_kit_<view_id>` channel and builds the
    /// native view, handing it the listener it reports through.
    pub fn new(view_id: i64, context: BridgeContext, make_view: impl FnOnce(ListenerRef) -> V) -> Self {
        let channel_name = channel_name(view_id);
        let channel = context.transport.open_channel(&channel_name);
        let shared = Arc::new(Shared {
            channel,
            executor: context.executor,
            picture_in_progress: AtomicBool::new(false),
            permission_pending: AtomicBool::new(false),
        });

        let listener: Arc<dyn CameraEventListener> = Arc::new(BridgeListener {
            shared: Arc::clone(&shared),
        });
        let view = make_view(listener);
        crate::debug!(target: "asimov_camera_bridge", view_id, view = %view.name(), "camera bridge created");

        Self {
            view_id,
            channel_name,
            shared,
            permissions: context.permissions,
            view: Some(view),
        }
    }

    pub fn view_id(&self) -> i64 {
        self.view_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn view_name(&self) -> Option<Cow<'_, str>> {
        self.view.as_ref().map(|v| v.name())
    }

    pub fn is_disposed(&self) -> bool {
        self.view.is_none()
    }

    /// The native view's embeddable surface, until disposal.
    pub fn surface(&self) -> Option<&V::Surface> {
        self.view.as_ref().map(|v| v.surface())
    }

    /// Handles one incoming call. `result` is answered exactly once, later
    /// or right away, unless the call is a well-formed fire-and-forget one.
    pub fn dispatch(&mut self, method: &str, arguments: Value, result: PendingResult) {
        let method: Method = match method.parse() {
            Ok(method) => method,
            Err(_) => {
                crate::debug!(target: "asimov_camera_bridge", method, "call not implemented");
                result.not_implemented();
                return;
            },
        };
        crate::trace!(target: "asimov_camera_bridge", %method, "dispatching call");

        match Command::parse(method, arguments) {
            Ok(command) => self.execute(command, result),
            Err(err) => {
                crate::warn!(target: "asimov_camera_bridge", %method, %err, "rejected call");
                result.fail(&err);
            },
        }
    }

    /// Runs an already-parsed call.
    pub fn execute(&mut self, command: Command, result: PendingResult) {
        match command {
            Command::RequestPermission => self.request_permission(result),
            Command::TakePicture => self.take_picture(result),
            Command::InitCamera(options) => self.with_view(|v| v.init_camera(&options)),
            Command::ResumeCamera => self.with_view(|v| v.resume_camera()),
            Command::PauseCamera => self.with_view(|v| v.pause_camera()),
            Command::ChangeFlashMode(mode) => self.with_view(|v| v.change_flash_mode(mode)),
            Command::SetCameraVisible(visible) => self.with_view(|v| v.set_camera_visible(visible)),
            Command::Dispose => self.dispose(),
        }
    }

    /// Releases the native view. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(mut view) = self.view.take() {
            crate::debug!(target: "asimov_camera_bridge", view_id = self.view_id, "disposing camera view");
            view.dispose();
        }
    }

    fn with_view(&mut self, f: impl FnOnce(&mut V)) {
        match self.view.as_mut() {
            Some(view) => f(view),
            None => {
                crate::debug!(target: "asimov_camera_bridge", view_id = self.view_id, "camera view disposed, call ignored");
            },
        }
    }

    fn request_permission(&self, result: PendingResult) {
        if self.permissions.check(CAMERA_PERMISSION) == PermissionState::Granted {
            result.success(true);
            return;
        }
        if self.shared.permission_pending.swap(true, Ordering::SeqCst) {
            crate::warn!(target: "asimov_camera_bridge", "permission prompt already showing");
            result.fail(&BridgeError::PermissionRequestPending);
            return;
        }

        let mut ticket = PermissionTicket {
            result: Some(result),
            shared: Arc::clone(&self.shared),
        };
        self.permissions.request(
            &[CAMERA_PERMISSION],
            REQUEST_CAMERA_PERMISSION,
            Box::new(move |response| ticket.finish(response.all_granted())),
        );
    }

    fn take_picture(&mut self, result: PendingResult) {
        let Some(view) = self.view.as_mut() else {
            result.fail(&BridgeError::Disposed);
            return;
        };
        if self.shared.picture_in_progress.swap(true, Ordering::SeqCst) {
            crate::warn!(target: "asimov_camera_bridge", "capture already in progress");
            result.fail(&BridgeError::PictureInProgress);
            return;
        }
        view.take_picture(PictureRequest::new(result, Arc::clone(&self.shared)));
    }
}

impl<V: NativeCameraView> Drop for CameraKitBridge<V> {
    fn drop(&mut self) {
        self.dispose();
    }
}
