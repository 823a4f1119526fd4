use thiserror::Error;

/// Error type for the password hash primitive.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PasswordError {
    #[error("could not hash password: {0}")]
    HashingFailed(String),

    #[error("could not verify password: {0}")]
    VerificationFailed(String),
}
