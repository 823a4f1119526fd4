use thiserror::Error;

/// Error type for token encode/decode.
///
/// Verification failures are returned as values of this type; nothing is
/// thrown past the codec boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("token is expired")]
    TokenExpired,

    #[error("token issuer does not match {expected:?}")]
    InvalidIssuer { expected: String },

    #[error("token audience does not include {expected:?}")]
    InvalidAudience { expected: String },

    #[error("missing required claim: {0}")]
    MissingClaim(String),
}
