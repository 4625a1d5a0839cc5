// This is free and unencumbered software released into the public domain.

//! CLI helpers: the replay script format, the replay session, error
//! reporting, verbosity handling.
//!
//! The script parser compiles without the `cli` feature so it can be tested
//! and reused in non-CLI builds.

use crate::shared::{Barcode, PermissionState, Value};
use bytes::Bytes;
use thiserror::Error;

#[cfg(feature = "cli")]
use asimov_module::SysexitsError::{self, *};

#[cfg(feature = "cli")]
use crate::shared::{
    BridgeContext, CAMERA_PERMISSION, CameraKitBridge, PendingResult, QueuedExecutor, Reply,
    drivers::loopback::{LoopbackCameraView, LoopbackHandle, RecordingTransport, ScriptedPermissionHost},
};

#[cfg(feature = "cli")]
use clientele::StandardOptions;

#[cfg(feature = "cli")]
use serde_json::json;

#[cfg(feature = "cli")]
use std::{
    io::{self, BufRead, Write},
    sync::{
        Arc,
        mpsc::{Receiver, Sender, channel},
    },
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed JSON")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {reason}")]
    Script { line: usize, reason: String },
}

impl ReplayError {
    pub fn script(line: usize, reason: impl Into<String>) -> Self {
        Self::Script {
            line,
            reason: reason.into(),
        }
    }
}

/// How a scripted permission prompt is answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptAnswer {
    Answer(PermissionState),
    Dismiss,
}

/// One line of a replay script.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptStep {
    /// A call arriving on the method channel.
    Call { method: String, arguments: Value },
    /// The native view decoding a barcode.
    Barcode(Barcode),
    /// The native view finishing the oldest capture.
    Picture { path: String },
    /// The native view failing the oldest capture.
    PictureFailed { code: String, message: String },
    /// The native view dropping the oldest capture.
    PictureAbandoned,
    /// The user answering the oldest permission prompt.
    Permission(PromptAnswer),
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_step(line_no: usize, line: &str) -> Result<Option<ScriptStep>, ReplayError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let json: serde_json::Value = serde_json::from_str(line).map_err(|source| ReplayError::Json {
        line: line_no,
        source,
    })?;
    let obj = json
        .as_object()
        .ok_or_else(|| ReplayError::script(line_no, "expected a JSON object"))?;
    let str_field = |key: &str| -> Result<String, ReplayError> {
        obj.get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| ReplayError::script(line_no, format!("expected string field `{key}`")))
    };

    if let Some(method) = obj.get("call") {
        let method = method
            .as_str()
            .ok_or_else(|| ReplayError::script(line_no, "`call` must be a method name"))?;
        let arguments = obj
            .get("arguments")
            .cloned()
            .map(Value::from_json)
            .unwrap_or_default();
        return Ok(Some(ScriptStep::Call {
            method: method.into(),
            arguments,
        }));
    }

    if let Some(answer) = obj.get("permission") {
        let answer = match answer.as_str() {
            Some("granted") => PromptAnswer::Answer(PermissionState::Granted),
            Some("denied") => PromptAnswer::Answer(PermissionState::Denied),
            Some("dismiss") => PromptAnswer::Dismiss,
            _ => {
                return Err(ReplayError::script(
                    line_no,
                    "`permission` must be granted, denied or dismiss",
                ));
            },
        };
        return Ok(Some(ScriptStep::Permission(answer)));
    }

    let event = str_field("emit")?;
    let step = match event.as_str() {
        "barcode" => ScriptStep::Barcode(Barcode {
            raw_value: obj.get("code").and_then(|v| v.as_str()).map(String::from),
            format: obj
                .get("type")
                .and_then(|v| v.as_i64())
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| ReplayError::script(line_no, "barcode needs an integer `type`"))?,
            raw_bytes: match obj.get("rawBytes") {
                None | Some(serde_json::Value::Null) => None,
                Some(bytes) => Some(parse_bytes(line_no, bytes)?),
            },
        }),
        "picture" => ScriptStep::Picture {
            path: str_field("path")?,
        },
        "pictureFailed" => ScriptStep::PictureFailed {
            code: str_field("code")?,
            message: str_field("message")?,
        },
        "pictureAbandoned" => ScriptStep::PictureAbandoned,
        other => {
            return Err(ReplayError::script(line_no, format!("unknown event `{other}`")));
        },
    };
    Ok(Some(step))
}

fn parse_bytes(line_no: usize, json: &serde_json::Value) -> Result<Bytes, ReplayError> {
    let items = json
        .as_array()
        .ok_or_else(|| ReplayError::script(line_no, "`rawBytes` must be an array"))?;
    items
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| ReplayError::script(line_no, "`rawBytes` entries must be 0..=255"))
        })
        .collect::<Result<Vec<u8>, _>>()
        .map(Bytes::from)
}

/// A bridge over a loopback view, fed one script step at a time.
///
/// Replies are printed as `{"call", "method", "reply"}` lines and channel
/// notifications as `{"channel", "notify", "arguments"}` lines, replies first.
#[cfg(feature = "cli")]
pub struct ReplaySession {
    bridge: CameraKitBridge<LoopbackCameraView>,
    view: LoopbackHandle,
    executor: Arc<QueuedExecutor>,
    transport: RecordingTransport,
    permissions: ScriptedPermissionHost,
    replies_tx: Sender<(usize, String, Reply)>,
    replies_rx: Receiver<(usize, String, Reply)>,
    calls: usize,
}

#[cfg(feature = "cli")]
impl ReplaySession {
    pub fn new(view_id: i64, granted: bool) -> Result<Self, ReplayError> {
        let executor = Arc::new(QueuedExecutor::new());
        let transport = RecordingTransport::new();
        let permissions = if granted {
            ScriptedPermissionHost::granted(CAMERA_PERMISSION)
        } else {
            ScriptedPermissionHost::new()
        };
        let context = BridgeContext {
            transport: Arc::new(transport.clone()),
            executor: executor.clone(),
            permissions: Arc::new(permissions.clone()),
        };

        let mut view = None;
        let bridge = CameraKitBridge::new(view_id, context, |listener| {
            let (v, handle) = LoopbackCameraView::new(listener);
            view = Some(handle);
            v
        });
        let view = view.ok_or_else(|| ReplayError::script(0, "camera view was not created"))?;

        let (replies_tx, replies_rx) = channel();
        Ok(Self {
            bridge,
            view,
            executor,
            transport,
            permissions,
            replies_tx,
            replies_rx,
            calls: 0,
        })
    }

    pub fn channel_name(&self) -> &str {
        self.bridge.channel_name()
    }

    /// Applies one step and drains the UI queue. Returns a warning when the
    /// step had nothing to act on.
    pub fn step(&mut self, step: ScriptStep) -> Option<&'static str> {
        let warning = match step {
            ScriptStep::Call { method, arguments } => {
                self.calls += 1;
                let call = self.calls;
                let tx = self.replies_tx.clone();
                let name = method.clone();
                let result = PendingResult::new(move |reply| {
                    let _ = tx.send((call, name, reply));
                });
                self.bridge.dispatch(&method, arguments, result);
                None
            },
            ScriptStep::Barcode(barcode) => {
                self.view.emit_barcode(barcode);
                None
            },
            ScriptStep::Picture { path } => {
                (!self.view.complete_picture(path)).then_some("no capture in progress")
            },
            ScriptStep::PictureFailed { code, message } => {
                (!self.view.fail_picture(code, message)).then_some("no capture in progress")
            },
            ScriptStep::PictureAbandoned => {
                (!self.view.abandon_picture()).then_some("no capture in progress")
            },
            ScriptStep::Permission(answer) => {
                let answered = match answer {
                    PromptAnswer::Answer(state) => self.permissions.answer(state),
                    PromptAnswer::Dismiss => self.permissions.dismiss(),
                };
                (!answered).then_some("no permission prompt showing")
            },
        };
        self.executor.run_pending();
        warning
    }

    /// Writes every reply and notification produced since the last flush.
    pub fn flush(&self, out: &mut impl Write) -> io::Result<()> {
        while let Ok((call, method, reply)) = self.replies_rx.try_recv() {
            writeln!(out, "{}", json!({ "call": call, "method": method, "reply": reply.to_json() }))?;
        }
        for message in self.transport.take_sent() {
            writeln!(
                out,
                "{}",
                json!({
                    "channel": message.channel,
                    "notify": message.method,
                    "arguments": message.arguments.to_json(),
                })
            )?;
        }
        out.flush()
    }

    /// Replays a whole script, then disposes the view so outstanding
    /// captures are answered.
    pub fn run(
        &mut self,
        input: impl BufRead,
        out: &mut impl Write,
        mut warn: impl FnMut(&str),
    ) -> Result<(), ReplayError> {
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let Some(step) = parse_step(index + 1, &line)? else {
                continue;
            };
            if let Some(warning) = self.step(step) {
                warn(warning);
            }
            self.flush(out)?;
        }

        self.bridge.dispose();
        self.executor.run_pending();
        self.flush(out)?;

        if self.permissions.pending_prompts() > 0 {
            warn("script ended with a permission prompt still showing");
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub fn handle_error(err: &ReplayError, flags: &StandardOptions) -> SysexitsError {
    #[cfg(feature = "tracing")]
    {
        use asimov_module::tracing::{debug, error};

        error!(target: "asimov_camera_bridge", %err, "replay failed");

        if flags.debug || flags.verbose >= 2 {
            debug!(target: "asimov_camera_bridge", ?err, "detailed error");
        }
    }

    report_error(err, flags);
    map_error_to_sysexit(err)
}

#[cfg(feature = "cli")]
pub fn info_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("INFO: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::info!(target: "asimov_camera_bridge", "{msg}");
}

#[cfg(feature = "cli")]
pub fn warn_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("WARN: {msg}");
    }

    #[cfg(feature = "tracing")]
    asimov_module::tracing::warn!(target: "asimov_camera_bridge", "{msg}");
}

#[cfg(feature = "cli")]
fn report_error(err: &ReplayError, flags: &StandardOptions) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "ERROR: {err}");

    if flags.debug || flags.verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {}", cause);
            source = cause.source();
        }
    }
}

#[cfg(feature = "cli")]
fn map_error_to_sysexit(err: &ReplayError) -> SysexitsError {
    match err {
        ReplayError::Io(_) => EX_IOERR,
        ReplayError::Json { .. } => EX_DATAERR,
        ReplayError::Script { .. } => EX_DATAERR,
    }
}
