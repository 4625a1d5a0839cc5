// This is free and unencumbered software released into the public domain.

use super::{
    AndroidCameraMode, Arguments, BarcodeFormats, BridgeResult, CameraOptions, CameraSelector,
    FlashMode, Value,
};
use core::str::FromStr;
use derive_more::Display;

/// Method names understood on the camera channel.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Method {
    #[display("requestPermission")]
    RequestPermission,
    #[display("initCamera")]
    InitCamera,
    #[display("resumeCamera")]
    ResumeCamera,
    #[display("pauseCamera")]
    PauseCamera,
    #[display("takePicture")]
    TakePicture,
    #[display("changeFlashMode")]
    ChangeFlashMode,
    #[display("setCameraVisible")]
    SetCameraVisible,
    #[display("dispose")]
    Dispose,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::RequestPermission,
        Method::InitCamera,
        Method::ResumeCamera,
        Method::PauseCamera,
        Method::TakePicture,
        Method::ChangeFlashMode,
        Method::SetCameraVisible,
        Method::Dispose,
    ];
}

/// A method name that is not part of the camera channel protocol.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("unknown method `{_0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.to_string() == s)
            .ok_or_else(|| UnknownMethod(s.into()))
    }
}

/// A fully-parsed call.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    RequestPermission,
    InitCamera(CameraOptions),
    ResumeCamera,
    PauseCamera,
    TakePicture,
    ChangeFlashMode(FlashMode),
    SetCameraVisible(bool),
    Dispose,
}

impl Command {
    /// Parses the call's arguments. Methods without parameters never look at
    /// `arguments`, whatever its shape.
    pub fn parse(method: Method, arguments: Value) -> BridgeResult<Self> {
        Ok(match method {
            Method::RequestPermission => Command::RequestPermission,
            Method::InitCamera => {
                let args = Arguments::try_from(arguments)?;
                Command::InitCamera(CameraOptions {
                    has_barcode_reader: args.bool("hasBarcodeReader")?,
                    flash_mode: FlashMode::parse("flashMode", args.char("flashMode")?)?,
                    is_fill_scale: args.bool("isFillScale")?,
                    barcode_formats: BarcodeFormats::parse(
                        "barcodeMode",
                        args.int("barcodeMode")?,
                    )?,
                    android_camera_mode: AndroidCameraMode::parse(
                        "androidCameraMode",
                        args.int("androidCameraMode")?,
                    )?,
                    camera_selector: CameraSelector::parse(
                        "cameraSelector",
                        args.int("cameraSelector")?,
                    )?,
                })
            },
            Method::ResumeCamera => Command::ResumeCamera,
            Method::PauseCamera => Command::PauseCamera,
            Method::TakePicture => Command::TakePicture,
            Method::ChangeFlashMode => {
                let args = Arguments::try_from(arguments)?;
                Command::ChangeFlashMode(FlashMode::parse("flashMode", args.char("flashMode")?)?)
            },
            Method::SetCameraVisible => {
                let args = Arguments::try_from(arguments)?;
                Command::SetCameraVisible(args.bool("isCameraVisible")?)
            },
            Method::Dispose => Command::Dispose,
        })
    }
}
