// This is free and unencumbered software released into the public domain.

use asimov_camera_bridge::shared::{
    Arguments, Barcode, BarcodeFormats, BridgeContext, CAMERA_PERMISSION, CameraKitBridge,
    CameraOptions, CameraSelector, FlashMode, InlineExecutor, PendingResult, PermissionResponse,
    PermissionState, QueuedExecutor, REQUEST_CAMERA_PERMISSION, Reply, UiExecutor, Value,
    drivers::loopback::{
        LoopbackCameraView, LoopbackHandle, RecordingTransport, ScriptedPermissionHost, ViewCall,
    },
};
use bytes::Bytes;
use std::sync::{Arc, mpsc::Receiver};

struct Harness {
    bridge: CameraKitBridge<LoopbackCameraView>,
    view: LoopbackHandle,
    transport: RecordingTransport,
    permissions: ScriptedPermissionHost,
}

impl Harness {
    fn new(view_id: i64, executor: Arc<dyn UiExecutor>, permissions: ScriptedPermissionHost) -> Self {
        let transport = RecordingTransport::new();
        let context = BridgeContext {
            transport: Arc::new(transport.clone()),
            executor,
            permissions: Arc::new(permissions.clone()),
        };
        let mut handle = None;
        let bridge = CameraKitBridge::new(view_id, context, |listener| {
            let (view, h) = LoopbackCameraView::new(listener);
            handle = Some(h);
            view
        });
        Self {
            bridge,
            view: handle.unwrap(),
            transport,
            permissions,
        }
    }

    fn inline() -> Self {
        Self::new(7, Arc::new(InlineExecutor), ScriptedPermissionHost::new())
    }

    fn call(&mut self, method: &str, arguments: impl Into<Value>) -> Receiver<Reply> {
        let (result, rx) = PendingResult::channel();
        self.bridge.dispatch(method, arguments.into(), result);
        rx
    }
}

fn init_arguments() -> Value {
    [
        ("hasBarcodeReader", Value::Bool(true)),
        ("flashMode", Value::from("A")),
        ("isFillScale", Value::Bool(false)),
        ("barcodeMode", Value::Int(0)),
        ("androidCameraMode", Value::Int(0)),
        ("cameraSelector", Value::Int(1)),
    ]
    .into_iter()
    .collect()
}

#[test]
fn opens_the_per_view_channel() {
    let harness = Harness::new(3, Arc::new(InlineExecutor), ScriptedPermissionHost::new());
    assert_eq!(harness.transport.opened(), vec!["plugins/camera_kit_3".to_string()]);
    assert_eq!(harness.bridge.channel_name(), "plugins/camera_kit_3");
    assert_eq!(harness.bridge.view_id(), 3);
    assert_eq!(harness.bridge.view_name().as_deref(), Some("loopback"));
    assert_eq!(harness.bridge.surface().map(String::as_str), Some("loopback-surface"));
}

#[test]
fn fire_and_forget_calls_never_reply() {
    let mut harness = Harness::inline();
    let visible: Value = [("isCameraVisible", false)].into_iter().collect();
    let flash: Value = [("flashMode", "O")].into_iter().collect();

    let replies = vec![
        harness.call("initCamera", init_arguments()),
        harness.call("resumeCamera", Value::Null),
        harness.call("pauseCamera", Value::Null),
        harness.call("changeFlashMode", flash),
        harness.call("setCameraVisible", visible),
        harness.call("dispose", Value::Null),
    ];
    for rx in replies {
        assert!(rx.try_recv().is_err());
    }

    assert_eq!(
        harness.view.calls(),
        vec![
            ViewCall::InitCamera(
                CameraOptions::new()
                    .with_barcode_reader(BarcodeFormats::ALL)
                    .with_camera_selector(CameraSelector::Front)
            ),
            ViewCall::ResumeCamera,
            ViewCall::PauseCamera,
            ViewCall::ChangeFlashMode(FlashMode::On),
            ViewCall::SetCameraVisible(false),
            ViewCall::Dispose,
        ]
    );
    assert!(!harness.view.is_visible());
}

#[test]
fn permission_already_granted_replies_without_prompt() {
    let mut harness = Harness::new(
        0,
        Arc::new(QueuedExecutor::new()),
        ScriptedPermissionHost::granted(CAMERA_PERMISSION),
    );
    let rx = harness.call("requestPermission", Value::Null);
    // Answered synchronously, without going through the executor.
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(true)));
    assert_eq!(harness.permissions.prompts_shown(), 0);
}

#[test]
fn permission_prompt_granted() {
    let mut harness = Harness::inline();
    let rx = harness.call("requestPermission", Value::Null);
    assert!(rx.try_recv().is_err());
    assert_eq!(harness.permissions.prompts_shown(), 1);

    assert!(harness.permissions.answer(PermissionState::Granted));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(true)));
    assert_eq!(harness.permissions.pending_prompts(), 0);
}

#[test]
fn permission_prompt_with_any_denial_is_false() {
    let mut harness = Harness::inline();
    let rx = harness.call("requestPermission", Value::Null);
    let mut response = PermissionResponse::uniform(
        REQUEST_CAMERA_PERMISSION,
        &[CAMERA_PERMISSION, "android.permission.RECORD_AUDIO"],
        PermissionState::Granted,
    );
    response.grants[1] = PermissionState::Denied;
    assert!(harness.permissions.respond(response));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(false)));
}

#[test]
fn second_permission_request_is_rejected_while_prompt_shows() {
    let mut harness = Harness::inline();
    let first = harness.call("requestPermission", Value::Null);
    let second = harness.call("requestPermission", Value::Null);

    assert_eq!(second.try_recv().unwrap().error_code(), Some("permissionRequestPending"));
    assert_eq!(harness.permissions.prompts_shown(), 1);

    harness.permissions.answer(PermissionState::Denied);
    assert_eq!(first.try_recv().unwrap(), Reply::Success(Value::Bool(false)));

    // The slot is free again once the first prompt resolved.
    let third = harness.call("requestPermission", Value::Null);
    assert_eq!(harness.permissions.prompts_shown(), 2);
    harness.permissions.answer(PermissionState::Granted);
    assert_eq!(third.try_recv().unwrap(), Reply::Success(Value::Bool(true)));
}

#[test]
fn permission_response_resolves_its_own_request() {
    let mut harness = Harness::inline();
    let rx = harness.call("requestPermission", Value::Null);
    // The callback belongs to this request whatever code the host echoes.
    let response = PermissionResponse::uniform(1, &[CAMERA_PERMISSION], PermissionState::Granted);
    assert!(harness.permissions.respond(response));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(true)));
}

#[test]
fn dismissed_permission_prompt_answers_false() {
    let mut harness = Harness::inline();
    let rx = harness.call("requestPermission", Value::Null);
    assert!(harness.permissions.dismiss());
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(false)));
}

#[test]
fn take_picture_success() {
    let mut harness = Harness::inline();
    let rx = harness.call("takePicture", Value::Null);
    assert!(rx.try_recv().is_err());
    assert_eq!(harness.view.pending_pictures(), 1);

    assert!(harness.view.complete_picture("/data/camera/IMG_0001.jpg"));
    assert_eq!(rx.try_recv().unwrap(), Reply::Success("/data/camera/IMG_0001.jpg".into()));
    assert!(rx.try_recv().is_err());
}

#[test]
fn take_picture_failure_is_forwarded_verbatim() {
    let mut harness = Harness::inline();
    let rx = harness.call("takePicture", Value::Null);
    assert!(harness.view.fail_picture("CAMERA_ERROR", "capture session closed"));
    assert_eq!(
        rx.try_recv().unwrap(),
        Reply::Error {
            code: "CAMERA_ERROR".into(),
            message: Some("capture session closed".into()),
            details: Value::Null,
        }
    );
    assert!(rx.try_recv().is_err());
}

#[test]
fn take_picture_with_empty_path_fails() {
    let mut harness = Harness::inline();
    let rx = harness.call("takePicture", Value::Null);
    harness.view.complete_picture("");
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("emptyFilePath"));
}

#[test]
fn abandoned_picture_still_answers_once() {
    let mut harness = Harness::inline();
    let rx = harness.call("takePicture", Value::Null);
    assert!(harness.view.abandon_picture());
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("pictureAbandoned"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn concurrent_take_picture_is_rejected() {
    let mut harness = Harness::inline();
    let first = harness.call("takePicture", Value::Null);
    let second = harness.call("takePicture", Value::Null);
    assert_eq!(second.try_recv().unwrap().error_code(), Some("pictureInProgress"));
    assert_eq!(harness.view.pending_pictures(), 1);

    harness.view.complete_picture("/tmp/a.jpg");
    assert!(first.try_recv().unwrap().is_success());

    let third = harness.call("takePicture", Value::Null);
    harness.view.complete_picture("/tmp/b.jpg");
    assert_eq!(third.try_recv().unwrap(), Reply::Success("/tmp/b.jpg".into()));
}

#[test]
fn unknown_methods_are_not_implemented() {
    let mut harness = Harness::inline();
    for method in ["startScanning", "", "TAKEPICTURE"] {
        let rx = harness.call(method, Value::Null);
        assert_eq!(rx.try_recv().unwrap(), Reply::NotImplemented);
    }
    assert!(harness.view.calls().is_empty());
}

#[test]
fn malformed_arguments_are_invalid_argument_errors() {
    let mut harness = Harness::inline();

    let rx = harness.call("setCameraVisible", Value::Null);
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("invalidArgument"));

    let rx = harness.call("changeFlashMode", [("flashMode", 1)].into_iter().collect::<Value>());
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("invalidArgument"));

    let rx = harness.call("initCamera", Value::from("not a map"));
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("invalidArgument"));

    assert!(harness.view.calls().is_empty());
}

#[test]
fn parameterless_calls_ignore_argument_shape() {
    let mut harness = Harness::inline();
    assert!(harness.call("pauseCamera", Value::from("x")).try_recv().is_err());
    assert!(harness.call("resumeCamera", Value::Int(1)).try_recv().is_err());
    assert!(harness.call("dispose", Value::List(vec![])).try_recv().is_err());

    assert!(harness.bridge.is_disposed());
    assert_eq!(
        harness.view.calls(),
        vec![ViewCall::PauseCamera, ViewCall::ResumeCamera, ViewCall::Dispose]
    );
}

#[test]
fn dispose_twice_is_a_no_op() {
    let mut harness = Harness::inline();
    assert!(harness.call("dispose", Value::Null).try_recv().is_err());
    assert!(harness.bridge.is_disposed());
    harness.bridge.dispose();
    assert!(harness.call("dispose", Value::Null).try_recv().is_err());
    assert_eq!(harness.view.calls(), vec![ViewCall::Dispose]);
    assert!(harness.bridge.surface().is_none());
}

#[test]
fn calls_after_dispose() {
    let mut harness = Harness::inline();
    harness.bridge.dispose();

    assert!(harness.call("resumeCamera", Value::Null).try_recv().is_err());
    let rx = harness.call("takePicture", Value::Null);
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("cameraDisposed"));
    assert_eq!(harness.view.calls(), vec![ViewCall::Dispose]);

    // Permission requests do not need the view.
    let rx = harness.call("requestPermission", Value::Null);
    harness.permissions.answer(PermissionState::Granted);
    assert_eq!(rx.try_recv().unwrap(), Reply::Success(Value::Bool(true)));
}

#[test]
fn dispose_abandons_outstanding_picture() {
    let mut harness = Harness::inline();
    let rx = harness.call("takePicture", Value::Null);
    harness.bridge.dispose();
    assert_eq!(rx.try_recv().unwrap().error_code(), Some("pictureAbandoned"));
}

#[test]
fn dropping_the_bridge_disposes_the_view() {
    let harness = Harness::inline();
    let view = harness.view.clone();
    drop(harness);
    assert_eq!(view.calls(), vec![ViewCall::Dispose]);
}

#[test]
fn barcode_is_forwarded_as_notification() {
    let harness = Harness::inline();
    harness
        .view
        .emit_barcode(Barcode::new("ABC123", 32, Bytes::from_static(&[1, 2, 3])));

    let sent = harness.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, "plugins/camera_kit_7");
    assert_eq!(sent[0].method, "onBarcodeRead");
    let payload = sent[0].arguments.as_map().unwrap();
    assert_eq!(payload.len(), 3);
    assert_eq!(payload["code"], Value::from("ABC123"));
    assert_eq!(payload["type"], Value::Int(32));
    assert_eq!(payload["rawBytes"], Value::Bytes(Bytes::from_static(&[1, 2, 3])));
}

#[test]
fn barcodes_are_not_coalesced() {
    let harness = Harness::inline();
    for _ in 0..5 {
        harness.view.emit_barcode(Barcode::new("SAME", 256, Bytes::new()));
    }
    assert_eq!(harness.transport.take_sent().len(), 5);
    assert!(harness.transport.sent().is_empty());
}

#[test]
fn events_from_capture_thread_wait_for_the_ui_thread() {
    let executor = Arc::new(QueuedExecutor::new());
    let mut harness = Harness::new(1, executor.clone(), ScriptedPermissionHost::new());
    let rx = harness.call("takePicture", Value::Null);

    let view = harness.view.clone();
    std::thread::spawn(move || {
        view.emit_barcode(Barcode::new("4006381333931", 32, Bytes::new()));
        view.complete_picture("/tmp/frame.jpg");
    })
    .join()
    .unwrap();

    assert!(rx.try_recv().is_err());
    assert!(harness.transport.sent().is_empty());

    assert_eq!(executor.run_pending(), 2);
    assert_eq!(rx.try_recv().unwrap(), Reply::Success("/tmp/frame.jpg".into()));
    assert_eq!(harness.transport.sent().len(), 1);
}

#[test]
fn typed_arguments_reach_the_view() {
    let mut harness = Harness::inline();
    let arguments = Arguments::new()
        .with("hasBarcodeReader", false)
        .with("flashMode", "F")
        .with("isFillScale", true)
        .with("barcodeMode", 288)
        .with("androidCameraMode", 2)
        .with("cameraSelector", 0);
    let value: Value = [
        ("hasBarcodeReader", Value::Bool(false)),
        ("flashMode", Value::from("F")),
        ("isFillScale", Value::Bool(true)),
        ("barcodeMode", Value::Int(288)),
        ("androidCameraMode", Value::Int(2)),
        ("cameraSelector", Value::Int(0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(Arguments::try_from(value.clone()).unwrap(), arguments);

    harness.call("initCamera", value);
    let calls = harness.view.calls();
    let [ViewCall::InitCamera(options)] = calls.as_slice() else {
        panic!("expected a single initCamera call");
    };
    assert_eq!(options.flash_mode, FlashMode::Off);
    assert!(options.is_fill_scale);
    assert!(options.barcode_formats.contains(BarcodeFormats::QR_CODE));
    assert!(options.barcode_formats.contains(BarcodeFormats::EAN_13));
}
