// This is free and unencumbered software released into the public domain.

use super::{BridgeError, Value};
use std::sync::mpsc::{Receiver, channel};

/// The single response a call can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Success(Value),
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    NotImplemented,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            Reply::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            Reply::Success(value) => json!({ "success": value.to_json() }),
            Reply::Error {
                code,
                message,
                details,
            } => json!({
                "error": { "code": code, "message": message, "details": details.to_json() }
            }),
            Reply::NotImplemented => json!({ "notImplemented": true }),
        }
    }
}

impl From<&BridgeError> for Reply {
    fn from(err: &BridgeError) -> Self {
        Reply::Error {
            code: err.code().into(),
            message: Some(err.to_string()),
            details: Value::Null,
        }
    }
}

/// One-shot completion token for a single call.
///
/// Completing consumes the handle, so a call is answered at most once.
/// Dropping it unanswered is how fire-and-forget calls end.
pub struct PendingResult {
    complete: Box<dyn FnOnce(Reply) + Send + 'static>,
}

impl core::fmt::Debug for PendingResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingResult").finish_non_exhaustive()
    }
}

impl PendingResult {
    pub fn new(complete: impl FnOnce(Reply) + Send + 'static) -> Self {
        Self {
            complete: Box::new(complete),
        }
    }

    /// A handle whose reply is delivered to the returned receiver.
    pub fn channel() -> (Self, Receiver<Reply>) {
        let (tx, rx) = channel();
        let result = Self::new(move |reply| {
            let _ = tx.send(reply);
        });
        (result, rx)
    }

    pub fn reply(self, reply: Reply) {
        (self.complete)(reply)
    }

    pub fn success(self, value: impl Into<Value>) {
        self.reply(Reply::Success(value.into()))
    }

    pub fn fail(self, err: &BridgeError) {
        self.reply(err.into())
    }

    pub fn not_implemented(self) {
        self.reply(Reply::NotImplemented)
    }
}
