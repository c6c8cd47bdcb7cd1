//! Error types for market-dl
//!
//! One error enum covers the whole crate: transport failures from the HTTP
//! collaborator, wire decode failures, token-exchange failures, and the
//! purchase/delivery domain errors that map one-to-one onto the terminal
//! states of the delivery status dispatch.

use thiserror::Error;

/// Result type alias for market-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for market-dl
///
/// Every operation surfaces its failure immediately; nothing in the crate
/// retries or masks an error with a default value (the sole exception is the
/// pagination decoder, which treats a failed next-page fetch as the end of
/// the stream).
#[derive(Debug, Error)]
pub enum Error {
    /// Network/IO error from the HTTP collaborator
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes did not parse as the expected wire shape
    ///
    /// Indicates a protocol mismatch or a server-side change; never
    /// retryable.
    #[error("protocol decode error: {0}")]
    ProtocolDecode(String),

    /// Token exchange response lacked the expected token key
    ///
    /// Distinct from [`Error::Transport`]: the request completed, but the
    /// credential or session was not accepted.
    #[error("authentication failed: {context}")]
    Authentication {
        /// What was being exchanged when authentication failed
        context: String,
    },

    /// App does not exist or is restricted for this account/device
    #[error("app not found: {reason}")]
    AppNotFound {
        /// Server-supplied reason, when one was given
        reason: String,
    },

    /// Delivery refused: the app is not compatible with the device profile
    #[error("app not supported")]
    AppNotSupported,

    /// Delivery refused: the account holds no entitlement for the app
    #[error("app not purchased")]
    AppNotPurchased,

    /// Delivery reported success but described no downloadable artifacts
    #[error("delivery succeeded but returned no downloadable artifacts")]
    EmptyDownloads,

    /// Unclassified protocol failure
    #[error("unknown error: {reason}")]
    Unknown {
        /// Whatever detail is available, often none beyond a status code
        reason: String,
    },

    /// Remote returned a non-success status with a server-supplied message
    #[error("server error ({code}): {reason}")]
    Server {
        /// HTTP status code reported by the transport
        code: u16,
        /// Server-supplied error text
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Error::ProtocolDecode(err.to_string())
    }
}

impl Error {
    /// Build the error for a delivery status code that is not `1` (OK).
    ///
    /// Status `2` and `3` have defined meanings; everything else is
    /// [`Error::Unknown`].
    pub fn from_delivery_status(status: i32) -> Self {
        match status {
            2 => Error::AppNotSupported,
            3 => Error::AppNotPurchased,
            other => Error::Unknown {
                reason: format!("delivery status {other}"),
            },
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_status_2_maps_to_app_not_supported() {
        assert!(matches!(
            Error::from_delivery_status(2),
            Error::AppNotSupported
        ));
    }

    #[test]
    fn delivery_status_3_maps_to_app_not_purchased() {
        assert!(matches!(
            Error::from_delivery_status(3),
            Error::AppNotPurchased
        ));
    }

    #[test]
    fn undefined_delivery_status_maps_to_unknown() {
        let err = Error::from_delivery_status(99);
        match err {
            Error::Unknown { reason } => {
                assert!(
                    reason.contains("99"),
                    "reason should carry the raw status for diagnostics, got: {reason}"
                );
            }
            other => panic!("status 99 must map to Unknown, got {other:?}"),
        }
    }

    #[test]
    fn delivery_status_1_is_not_an_error_candidate() {
        // Status 1 never reaches from_delivery_status in the transaction,
        // but if it did it must not alias a defined failure.
        assert!(matches!(
            Error::from_delivery_status(1),
            Error::Unknown { .. }
        ));
    }

    #[test]
    fn display_messages_are_human_readable() {
        let err = Error::Server {
            code: 500,
            reason: "backend unavailable".into(),
        };
        assert_eq!(err.to_string(), "server error (500): backend unavailable");

        let err = Error::Authentication {
            context: "service token exchange".into(),
        };
        assert!(err.to_string().contains("service token exchange"));
    }

    #[test]
    fn prost_decode_error_converts_to_protocol_decode() {
        let decode_err = prost::DecodeError::new("buffer underflow");
        let err: Error = decode_err.into();
        assert!(matches!(err, Error::ProtocolDecode(_)));
        assert!(err.to_string().contains("buffer underflow"));
    }
}
