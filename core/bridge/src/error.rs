//! Error types for the bridge.

/// Failures reported by a presence service.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("Invalid presence application id: {0:?}")]
    InvalidAppId(String),

    #[error("Not connected to the presence service")]
    NotConnected,

    #[error("Presence service handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("Timed out waiting for the presence service handshake")]
    HandshakeTimeout,

    #[error("Presence service closed the connection")]
    ConnectionClosed,

    #[error("Timed out waiting for presence service to {0}")]
    Timeout(&'static str),

    #[error("Presence service failed to {context}: {source}")]
    Sdk {
        context: &'static str,
        #[source]
        source: discord_sdk::Error,
    },

    #[error("Failed to start presence runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl PresenceError {
    pub fn sdk(context: &'static str, source: discord_sdk::Error) -> Self {
        Self::Sdk { context, source }
    }
}

/// Failures that end the handling of a single notification.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Login to presence service failed: {0}")]
    Login(#[source] PresenceError),

    #[error("Publishing presence failed after {attempts} attempt(s): {source}")]
    Publish {
        attempts: u32,
        #[source]
        source: PresenceError,
    },
}
