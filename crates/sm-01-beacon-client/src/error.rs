//! Beacon client errors.

use thiserror::Error;

/// Errors that can occur when talking to the beacon node.
#[derive(Debug, Error)]
pub enum BeaconClientError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The node answered with an unexpected status code.
    #[error("Unexpected HTTP status {status} from {path}: '{body}'")]
    Status {
        /// Request path
        path: String,
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("Failed to decode response from {path}: {reason}")]
    Decode {
        /// Request path
        path: String,
        /// Decoder message
        reason: String,
    },

    /// Only the `head` topic is supported.
    #[error("Unsupported event topic: {0:?}")]
    UnsupportedTopic(String),

    /// The configured base URL is unusable.
    #[error("Invalid beacon node address: {0}")]
    InvalidUrl(String),
}

impl BeaconClientError {
    /// Whether the error is a configuration problem rather than a network one.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::UnsupportedTopic(_) | Self::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = BeaconClientError::Status {
            path: "/eth/v1/node/syncing".into(),
            status: 503,
            body: "unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/eth/v1/node/syncing"));
    }

    #[test]
    fn test_config_errors_are_flagged() {
        assert!(BeaconClientError::UnsupportedTopic("block".into()).is_config());
        assert!(!BeaconClientError::Decode {
            path: "/".into(),
            reason: "eof".into()
        }
        .is_config());
    }
}
