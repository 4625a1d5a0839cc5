// This is free and unencumbered software released into the public domain.

use derive_more::Display;

/// The OS permission the camera view needs.
pub const CAMERA_PERMISSION: &str = "android.permission.CAMERA";

/// Request code used for the camera permission prompt.
pub const REQUEST_CAMERA_PERMISSION: i32 = 10001;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum PermissionState {
    #[display("granted")]
    Granted,
    #[display("denied")]
    Denied,
    #[display("undetermined")]
    Undetermined,
}

/// The outcome of one permission prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionResponse {
    pub request_code: i32,
    pub permissions: Vec<String>,
    pub grants: Vec<PermissionState>,
}

impl PermissionResponse {
    /// A response with the same `state` for every permission.
    pub fn uniform(request_code: i32, permissions: &[&str], state: PermissionState) -> Self {
        Self {
            request_code,
            permissions: permissions.iter().map(|p| (*p).into()).collect(),
            grants: vec![state; permissions.len()],
        }
    }

    /// True only when at least one permission was answered and every
    /// answer is a grant. An empty answer means the prompt was cancelled.
    pub fn all_granted(&self) -> bool {
        !self.grants.is_empty() && self.grants.iter().all(|g| *g == PermissionState::Granted)
    }
}

pub type PermissionCallback = Box<dyn FnOnce(PermissionResponse) + Send + 'static>;

/// The host OS permission subsystem.
pub trait PermissionHost: Send + Sync {
    fn check(&self, permission: &str) -> PermissionState;

    /// Shows the permission prompt. `callback` is invoked once, when the
    /// user answers.
    fn request(&self, permissions: &[&str], request_code: i32, callback: PermissionCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_granted() {
        let granted =
            PermissionResponse::uniform(REQUEST_CAMERA_PERMISSION, &[CAMERA_PERMISSION], PermissionState::Granted);
        assert!(granted.all_granted());

        let mut mixed = PermissionResponse::uniform(
            REQUEST_CAMERA_PERMISSION,
            &[CAMERA_PERMISSION, "android.permission.RECORD_AUDIO"],
            PermissionState::Granted,
        );
        mixed.grants[1] = PermissionState::Denied;
        assert!(!mixed.all_granted());
    }

    #[test]
    fn cancelled_prompt_is_not_a_grant() {
        let cancelled = PermissionResponse {
            request_code: REQUEST_CAMERA_PERMISSION,
            permissions: Vec::new(),
            grants: Vec::new(),
        };
        assert!(!cancelled.all_granted());
    }
}
