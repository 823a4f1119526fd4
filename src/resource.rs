use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::config::AuthConfig;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::strategy::StrategyError;

/// Longest password accepted when setting a digest. bcrypt ignores bytes
/// past 72, so longer inputs would silently truncate.
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Failures of the resource password capability.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResourceError {
    #[error("password can not be empty")]
    EmptyPassword,

    #[error("passwords longer than {MAX_PASSWORD_LENGTH} bytes are truncated by bcrypt")]
    PasswordTooLong,

    #[error("password confirmation does not match")]
    InvalidPasswordConfirmation,

    #[error(transparent)]
    Hash(#[from] PasswordError),
}

/// A resolved, authenticated resource.
pub type Principal = Arc<dyn Resource>;

/// An authenticatable resource (a user record, an API client, ...).
///
/// Repositories hand these out and the password strategy authenticates
/// against them. Implementors only store the digest; hashing, comparison and
/// the validation chain are provided. Persisting the changed resource stays
/// the caller's responsibility.
pub trait Resource: Send + Sync {
    /// The stored password digest, if a password was ever set.
    fn password_digest(&self) -> Option<&str>;

    /// Replace the stored password digest.
    fn set_password_digest(&mut self, digest: Option<String>);

    /// Escape hatch for callers that need the concrete resource type back;
    /// the core only ever sees trait objects.
    fn as_any(&self) -> &dyn Any;

    /// Hash `password` and store the digest.
    ///
    /// Validates presence and the bcrypt length ceiling; the cost factor is
    /// `config.encryption_cost`.
    fn set_password(
        &mut self,
        password: &str,
        config: &AuthConfig,
    ) -> Result<&mut Self, ResourceError>
    where
        Self: Sized,
    {
        if password.is_empty() {
            return Err(ResourceError::EmptyPassword);
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ResourceError::PasswordTooLong);
        }

        let digest = PasswordHasher::new(config.encryption_cost).hash(password)?;
        self.set_password_digest(Some(digest));
        Ok(self)
    }

    /// Like `set_password`, but additionally requires `confirmation` to
    /// match the password.
    fn set_password_with_confirmation(
        &mut self,
        password: &str,
        confirmation: &str,
        config: &AuthConfig,
    ) -> Result<&mut Self, ResourceError>
    where
        Self: Sized,
    {
        if confirmation != password {
            return Err(ResourceError::InvalidPasswordConfirmation);
        }
        self.set_password(password, config)
    }

    /// Compare `candidate` against the stored digest.
    ///
    /// Fails with `InvalidCredentials` when no digest is stored, the digest
    /// is unreadable, or the candidate does not match.
    fn authenticate_password(&self, candidate: &str) -> Result<(), StrategyError> {
        let digest = self
            .password_digest()
            .ok_or(StrategyError::InvalidCredentials)?;

        match PasswordHasher::default().verify(candidate, digest) {
            Ok(true) => Ok(()),
            _ => Err(StrategyError::InvalidCredentials),
        }
    }
}
