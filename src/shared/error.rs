// This is free and unencumbered software released into the public domain.

use thiserror::Error;

/// Error code reported for missing or mistyped call arguments.
pub const INVALID_ARGUMENT: &str = "invalidArgument";
/// Error code reported when a permission prompt is already on screen.
pub const PERMISSION_REQUEST_PENDING: &str = "permissionRequestPending";
/// Error code reported when a still capture is already outstanding.
pub const PICTURE_IN_PROGRESS: &str = "pictureInProgress";
/// Error code reported for calls that need a camera view after `dispose`.
pub const CAMERA_DISPOSED: &str = "cameraDisposed";
/// Error code reported when the native view drops a capture request.
pub const PICTURE_ABANDONED: &str = "pictureAbandoned";
/// Error code reported when the native view reports success without a path.
pub const EMPTY_FILE_PATH: &str = "emptyFilePath";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),

    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("a camera permission request is already in flight")]
    PermissionRequestPending,

    #[error("a picture is already being taken")]
    PictureInProgress,

    #[error("camera view has been disposed")]
    Disposed,

    #[error("camera view released the capture request without completing it")]
    PictureAbandoned,

    #[error("camera view reported a capture without a file path")]
    EmptyFilePath,
}

impl BridgeError {
    #[inline]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments(reason.into())
    }

    /// The error code sent to the remote caller.
    pub fn code(&self) -> &'static str {
        use BridgeError::*;
        match self {
            MissingArgument(_) | InvalidArgument { .. } | InvalidArguments(_) => INVALID_ARGUMENT,
            PermissionRequestPending => PERMISSION_REQUEST_PENDING,
            PictureInProgress => PICTURE_IN_PROGRESS,
            Disposed => CAMERA_DISPOSED,
            PictureAbandoned => PICTURE_ABANDONED,
            EmptyFilePath => EMPTY_FILE_PATH,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code() == INVALID_ARGUMENT
    }
}

pub type BridgeResult<T = ()> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_share_one_code() {
        assert_eq!(BridgeError::MissingArgument("flashMode").code(), INVALID_ARGUMENT);
        assert_eq!(
            BridgeError::invalid_argument("flashMode", "expected a string").code(),
            INVALID_ARGUMENT
        );
        assert!(BridgeError::invalid_arguments("expected a map").is_invalid_argument());
        assert!(!BridgeError::Disposed.is_invalid_argument());
    }

    #[test]
    fn messages_name_the_argument() {
        let err = BridgeError::invalid_argument("cameraSelector", "unknown camera selector 7");
        assert_eq!(
            err.to_string(),
            "invalid argument `cameraSelector`: unknown camera selector 7"
        );
        assert_eq!(
            BridgeError::MissingArgument("isCameraVisible").to_string(),
            "missing argument `isCameraVisible`"
        );
    }
}
