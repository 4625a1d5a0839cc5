// This is free and unencumbered software released into the public domain.

//! In-process stand-ins for the host: a native view that records what it is
//! asked to do, a channel transport that records what is sent, and a
//! permission host answered by the caller.

use crate::shared::{
    Barcode, CameraOptions, ChannelTransport, FlashMode, ListenerRef, MethodChannel,
    NativeCameraView, PermissionCallback, PermissionHost, PermissionResponse, PermissionState,
    PictureRequest, Value,
};
use alloc::borrow::Cow;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

/// A call the loopback view received.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewCall {
    InitCamera(CameraOptions),
    ResumeCamera,
    PauseCamera,
    TakePicture,
    ChangeFlashMode(FlashMode),
    SetCameraVisible(bool),
    Dispose,
}

#[derive(Debug, Default)]
struct LoopbackState {
    calls: Vec<ViewCall>,
    pictures: VecDeque<PictureRequest>,
    visible: bool,
}

/// A native view without hardware behind it.
#[derive(Debug)]
pub struct LoopbackCameraView {
    state: Arc<Mutex<LoopbackState>>,
    surface: String,
}

impl LoopbackCameraView {
    /// Creates the view and a handle for driving its events.
    pub fn new(listener: ListenerRef) -> (Self, LoopbackHandle) {
        let state = Arc::new(Mutex::new(LoopbackState {
            visible: true,
            ..Default::default()
        }));
        let handle = LoopbackHandle {
            listener,
            state: Arc::clone(&state),
        };
        let view = Self {
            state,
            surface: "loopback-surface".into(),
        };
        (view, handle)
    }

    fn record(&self, call: ViewCall) {
        lock(&self.state).calls.push(call);
    }
}

impl dogma::Named for LoopbackCameraView {
    fn name(&self) -> Cow<'_, str> {
        "loopback".into()
    }
}

impl NativeCameraView for LoopbackCameraView {
    type Surface = String;

    fn init_camera(&mut self, options: &CameraOptions) {
        self.record(ViewCall::InitCamera(options.clone()));
    }

    fn resume_camera(&mut self) {
        self.record(ViewCall::ResumeCamera);
    }

    fn pause_camera(&mut self) {
        self.record(ViewCall::PauseCamera);
    }

    fn take_picture(&mut self, request: PictureRequest) {
        let mut state = lock(&self.state);
        state.calls.push(ViewCall::TakePicture);
        state.pictures.push_back(request);
    }

    fn change_flash_mode(&mut self, mode: FlashMode) {
        self.record(ViewCall::ChangeFlashMode(mode));
    }

    fn set_camera_visible(&mut self, visible: bool) {
        let mut state = lock(&self.state);
        state.calls.push(ViewCall::SetCameraVisible(visible));
        state.visible = visible;
    }

    fn dispose(&mut self) {
        // Parked requests are dropped here and answer as abandoned.
        let pictures = {
            let mut state = lock(&self.state);
            state.calls.push(ViewCall::Dispose);
            core::mem::take(&mut state.pictures)
        };
        drop(pictures);
    }

    fn surface(&self) -> &Self::Surface {
        &self.surface
    }
}

/// Drives a [`LoopbackCameraView`] from any thread, as a capture pipeline
/// would.
#[derive(Clone, Debug)]
pub struct LoopbackHandle {
    listener: ListenerRef,
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackHandle {
    pub fn calls(&self) -> Vec<ViewCall> {
        lock(&self.state).calls.clone()
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn pending_pictures(&self) -> usize {
        lock(&self.state).pictures.len()
    }

    pub fn emit_barcode(&self, barcode: Barcode) {
        self.listener.on_barcode_read(barcode);
    }

    /// Completes the oldest outstanding capture. Returns false if none is
    /// outstanding.
    pub fn complete_picture(&self, file_path: impl Into<String>) -> bool {
        match self.next_picture() {
            Some(request) => {
                self.listener.on_take_picture(request, file_path.into());
                true
            },
            None => false,
        }
    }

    /// Fails the oldest outstanding capture. Returns false if none is
    /// outstanding.
    pub fn fail_picture(&self, code: impl Into<String>, message: impl Into<String>) -> bool {
        match self.next_picture() {
            Some(request) => {
                self.listener
                    .on_take_picture_failed(request, code.into(), message.into());
                true
            },
            None => false,
        }
    }

    /// Drops the oldest outstanding capture without answering it.
    pub fn abandon_picture(&self) -> bool {
        self.next_picture().is_some()
    }

    fn next_picture(&self) -> Option<PictureRequest> {
        // Released before the listener runs so it may re-enter the view.
        lock(&self.state).pictures.pop_front()
    }
}

/// A channel message captured by [`RecordingTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentMessage {
    pub channel: String,
    pub method: String,
    pub arguments: Value,
}

#[derive(Debug)]
struct RecordingChannel {
    name: String,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MethodChannel for RecordingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke_method(&self, method: &str, arguments: Value) {
        lock(&self.sent).push(SentMessage {
            channel: self.name.clone(),
            method: method.into(),
            arguments,
        });
    }
}

/// Channel transport that keeps every message sent on any channel it opened.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    opened: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// Removes and returns everything sent so far.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        core::mem::take(&mut *lock(&self.sent))
    }
}

impl ChannelTransport for RecordingTransport {
    fn open_channel(&self, name: &str) -> Arc<dyn MethodChannel> {
        lock(&self.opened).push(name.into());
        Arc::new(RecordingChannel {
            name: name.into(),
            sent: Arc::clone(&self.sent),
        })
    }
}

struct Prompt {
    permissions: Vec<String>,
    request_code: i32,
    callback: PermissionCallback,
}

#[derive(Default)]
struct PermissionInner {
    states: Vec<(String, PermissionState)>,
    prompts: VecDeque<Prompt>,
    prompts_shown: usize,
}

/// Permission host whose prompts wait until the caller answers them.
#[derive(Clone, Default)]
pub struct ScriptedPermissionHost {
    inner: Arc<Mutex<PermissionInner>>,
}

impl core::fmt::Debug for ScriptedPermissionHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("ScriptedPermissionHost")
            .field("states", &inner.states)
            .field("pending_prompts", &inner.prompts.len())
            .field("prompts_shown", &inner.prompts_shown)
            .finish()
    }
}

impl ScriptedPermissionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host on which `permission` is already granted.
    pub fn granted(permission: &str) -> Self {
        let host = Self::new();
        host.set_state(permission, PermissionState::Granted);
        host
    }

    pub fn set_state(&self, permission: &str, state: PermissionState) {
        let mut inner = lock(&self.inner);
        inner.states.retain(|(p, _)| p != permission);
        inner.states.push((permission.into(), state));
    }

    /// How many prompts have been shown in total.
    pub fn prompts_shown(&self) -> usize {
        lock(&self.inner).prompts_shown
    }

    pub fn pending_prompts(&self) -> usize {
        lock(&self.inner).prompts.len()
    }

    /// Answers the oldest prompt with `state` for each of its permissions and
    /// records the new state. Returns false if no prompt is showing.
    pub fn answer(&self, state: PermissionState) -> bool {
        let Some(prompt) = lock(&self.inner).prompts.pop_front() else {
            return false;
        };
        for permission in &prompt.permissions {
            self.set_state(permission, state);
        }
        let names: Vec<&str> = prompt.permissions.iter().map(String::as_str).collect();
        (prompt.callback)(PermissionResponse::uniform(prompt.request_code, &names, state));
        true
    }

    /// Answers the oldest prompt with an explicit response.
    pub fn respond(&self, response: PermissionResponse) -> bool {
        let Some(prompt) = lock(&self.inner).prompts.pop_front() else {
            return false;
        };
        (prompt.callback)(response);
        true
    }

    /// Closes the oldest prompt without ever calling back.
    pub fn dismiss(&self) -> bool {
        let prompt = lock(&self.inner).prompts.pop_front();
        prompt.is_some()
    }
}

impl PermissionHost for ScriptedPermissionHost {
    fn check(&self, permission: &str) -> PermissionState {
        lock(&self.inner)
            .states
            .iter()
            .find(|(p, _)| p == permission)
            .map(|(_, s)| *s)
            .unwrap_or(PermissionState::Undetermined)
    }

    fn request(&self, permissions: &[&str], request_code: i32, callback: PermissionCallback) {
        let mut inner = lock(&self.inner);
        inner.prompts_shown += 1;
        inner.prompts.push_back(Prompt {
            permissions: permissions.iter().map(|p| (*p).into()).collect(),
            request_code,
            callback,
        });
    }
}
