// This is free and unencumbered software released into the public domain.

use super::{BridgeError, BridgeResult};
use derive_more::Display;

/// Flash mode, encoded on the wire as a single character.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum FlashMode {
    #[default]
    #[display("auto")]
    Auto,
    #[display("on")]
    On,
    #[display("off")]
    Off,
}

impl FlashMode {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(FlashMode::Auto),
            'O' => Some(FlashMode::On),
            'F' => Some(FlashMode::Off),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            FlashMode::Auto => 'A',
            FlashMode::On => 'O',
            FlashMode::Off => 'F',
        }
    }

    pub(crate) fn parse(name: &'static str, code: char) -> BridgeResult<Self> {
        Self::from_code(code)
            .ok_or_else(|| BridgeError::invalid_argument(name, format!("unknown flash mode {code:?}")))
    }
}

/// Set of barcode symbologies the reader should look for.
///
/// The bit values match the ML Kit format constants; the empty set means
/// every supported format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BarcodeFormats(u32);

impl BarcodeFormats {
    pub const ALL: Self = Self(0);
    pub const CODE_128: Self = Self(1);
    pub const CODE_39: Self = Self(2);
    pub const CODE_93: Self = Self(4);
    pub const CODABAR: Self = Self(8);
    pub const DATA_MATRIX: Self = Self(16);
    pub const EAN_13: Self = Self(32);
    pub const EAN_8: Self = Self(64);
    pub const ITF: Self = Self(128);
    pub const QR_CODE: Self = Self(256);
    pub const UPC_A: Self = Self(512);
    pub const UPC_E: Self = Self(1024);
    pub const PDF417: Self = Self(2048);
    pub const AZTEC: Self = Self(4096);

    const KNOWN_BITS: u32 = 0x1fff;

    pub fn from_bits(bits: u32) -> Option<Self> {
        (bits & !Self::KNOWN_BITS == 0).then_some(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_all(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.is_all() || (self.0 & other.0 == other.0 && !other.is_all())
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub(crate) fn parse(name: &'static str, code: i32) -> BridgeResult<Self> {
        u32::try_from(code)
            .ok()
            .and_then(Self::from_bits)
            .ok_or_else(|| BridgeError::invalid_argument(name, format!("unknown barcode formats {code}")))
    }
}

/// Which Android camera stack the native view should drive.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum AndroidCameraMode {
    #[default]
    #[display("camerax")]
    CameraX,
    #[display("camera2")]
    Camera2,
    #[display("camera1")]
    Camera1,
}

impl AndroidCameraMode {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AndroidCameraMode::CameraX),
            1 => Some(AndroidCameraMode::Camera2),
            2 => Some(AndroidCameraMode::Camera1),
            _ => None,
        }
    }

    pub(crate) fn parse(name: &'static str, code: i32) -> BridgeResult<Self> {
        Self::from_code(code).ok_or_else(|| {
            BridgeError::invalid_argument(name, format!("unknown android camera mode {code}"))
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum CameraSelector {
    #[default]
    #[display("back")]
    Back,
    #[display("front")]
    Front,
}

impl CameraSelector {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CameraSelector::Back),
            1 => Some(CameraSelector::Front),
            _ => None,
        }
    }

    pub(crate) fn parse(name: &'static str, code: i32) -> BridgeResult<Self> {
        Self::from_code(code).ok_or_else(|| {
            BridgeError::invalid_argument(name, format!("unknown camera selector {code}"))
        })
    }
}

/// Options the native view is started with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraOptions {
    pub has_barcode_reader: bool,
    pub flash_mode: FlashMode,
    pub is_fill_scale: bool,
    pub barcode_formats: BarcodeFormats,
    pub android_camera_mode: AndroidCameraMode,
    pub camera_selector: CameraSelector,
}

impl CameraOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_barcode_reader(mut self, formats: BarcodeFormats) -> Self {
        self.has_barcode_reader = true;
        self.barcode_formats = formats;
        self
    }

    pub fn with_flash_mode(mut self, mode: FlashMode) -> Self {
        self.flash_mode = mode;
        self
    }

    pub fn with_fill_scale(mut self, enabled: bool) -> Self {
        self.is_fill_scale = enabled;
        self
    }

    pub fn with_android_camera_mode(mut self, mode: AndroidCameraMode) -> Self {
        self.android_camera_mode = mode;
        self
    }

    pub fn with_camera_selector(mut self, selector: CameraSelector) -> Self {
        self.camera_selector = selector;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_mode_codes() {
        for mode in [FlashMode::Auto, FlashMode::On, FlashMode::Off] {
            assert_eq!(FlashMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(FlashMode::from_code('X'), None);
        assert_eq!(FlashMode::Off.to_string(), "off");
    }

    #[test]
    fn barcode_formats() {
        let formats = BarcodeFormats::QR_CODE.with(BarcodeFormats::EAN_13);
        assert_eq!(formats.bits(), 288);
        assert!(formats.contains(BarcodeFormats::EAN_13));
        assert!(!formats.contains(BarcodeFormats::AZTEC));
        assert!(BarcodeFormats::ALL.contains(BarcodeFormats::AZTEC));
        assert_eq!(BarcodeFormats::from_bits(0x2000), None);
        assert!(BarcodeFormats::parse("barcodeMode", -1).is_err());
    }

    #[test]
    fn enum_codes() {
        assert_eq!(AndroidCameraMode::from_code(1), Some(AndroidCameraMode::Camera2));
        assert_eq!(AndroidCameraMode::from_code(3), None);
        assert_eq!(CameraSelector::from_code(1), Some(CameraSelector::Front));
        assert!(CameraSelector::parse("cameraSelector", 2).is_err());
    }

    #[test]
    fn builder() {
        let options = CameraOptions::new()
            .with_barcode_reader(BarcodeFormats::QR_CODE)
            .with_flash_mode(FlashMode::Off)
            .with_camera_selector(CameraSelector::Front);
        assert!(options.has_barcode_reader);
        assert!(!options.is_fill_scale);
        assert_eq!(options.barcode_formats, BarcodeFormats::QR_CODE);
        assert_eq!(options.flash_mode, FlashMode::Off);
        assert_eq!(options.android_camera_mode, AndroidCameraMode::CameraX);
    }
}
