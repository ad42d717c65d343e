//! Notification schema for the geo-presence bridge.
//!
//! Shared by the bridge and anything that reports browser activity to it (the
//! browser extension, scripts) so both sides agree on the wire shape. The
//! bridge remains the authority on validation.

use serde::{Deserialize, Serialize};

pub const MAX_REQUEST_BYTES: usize = 1024 * 1024; // 1MB

/// Body returned for a `close` notification.
pub const CLOSE_CONFIRMATION: &str = "Discord RPC cleared";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The browser is on a game page; `open` is what the extension sends on tab load.
    #[serde(alias = "open")]
    Update,
    /// No game tab remains open.
    Close,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    #[serde(default)]
    pub url: String,
    pub action: Action,
}

impl Notification {
    pub fn update(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            action: Action::Update,
        }
    }

    pub fn close() -> Self {
        Self {
            url: String::new(),
            action: Action::Close,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

pub fn parse_notification(body: &[u8]) -> Result<Notification, ErrorInfo> {
    if body.len() > MAX_REQUEST_BYTES {
        return Err(ErrorInfo::new(
            "request_too_large",
            "request exceeded maximum size",
        ));
    }

    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ErrorInfo::new("empty_request", "request body was empty"));
    }

    serde_json::from_slice(body).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("Failed to parse request body: {}", err),
        )
    })
}
