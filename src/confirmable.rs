use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Confirmation failures, returned as values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    #[error("provided confirmation token is invalid")]
    InvalidConfirmationToken,

    #[error("provided confirmation token is expired")]
    ExpiredConfirmationToken,

    #[error("can't confirm an already confirmed resource")]
    ResourceAlreadyConfirmed,
}

/// Confirmation state carried by a resource.
///
/// Unset until details are generated, pending while a token is outstanding,
/// confirmed terminally once the token was consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfirmationDetails {
    token: Option<String>,
    set_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
}

impl ConfirmationDetails {
    /// Generate a fresh opaque token and stamp the current time, replacing
    /// any outstanding token. Tokens are never reused.
    pub fn set_details(&mut self) {
        self.token = Some(Uuid::new_v4().simple().to_string());
        self.set_at = Some(Utc::now());
    }

    /// Consume the pending token.
    ///
    /// An already confirmed resource always fails with
    /// `ResourceAlreadyConfirmed`; on a pending resource the checks run in
    /// order and short-circuit: token equality (non-empty), then the expiry
    /// window. On success the token and timestamp are cleared and
    /// `confirmed_at` is stamped.
    pub fn confirm(&mut self, candidate: &str, config: &AuthConfig) -> Result<(), ConfirmationError> {
        self.confirm_at(candidate, Utc::now(), config.confirmation_expiry_seconds)
    }

    pub(crate) fn confirm_at(
        &mut self,
        candidate: &str,
        now: DateTime<Utc>,
        expiry_seconds: i64,
    ) -> Result<(), ConfirmationError> {
        self.validate_not_confirmed()?;
        self.validate_token(candidate)?;
        self.validate_not_expired(now, expiry_seconds)?;

        self.token = None;
        self.set_at = None;
        self.confirmed_at = Some(now);
        Ok(())
    }

    /// The pending token, if one is outstanding.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_at(&self) -> Option<DateTime<Utc>> {
        self.set_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    fn validate_token(&self, candidate: &str) -> Result<(), ConfirmationError> {
        match self.token.as_deref() {
            Some(token) if token == candidate && !candidate.is_empty() => Ok(()),
            _ => Err(ConfirmationError::InvalidConfirmationToken),
        }
    }

    fn validate_not_expired(
        &self,
        now: DateTime<Utc>,
        expiry_seconds: i64,
    ) -> Result<(), ConfirmationError> {
        let Some(set_at) = self.set_at else {
            return Err(ConfirmationError::ExpiredConfirmationToken);
        };
        if now > set_at + Duration::seconds(expiry_seconds) {
            return Err(ConfirmationError::ExpiredConfirmationToken);
        }
        Ok(())
    }

    fn validate_not_confirmed(&self) -> Result<(), ConfirmationError> {
        if self.confirmed() {
            return Err(ConfirmationError::ResourceAlreadyConfirmed);
        }
        Ok(())
    }
}

/// Proof-of-ownership confirmation for a resource (e.g. email confirmation).
///
/// A capability mixed into a resource type: implementors embed a
/// [`ConfirmationDetails`] and expose it through the two accessors; the
/// workflow itself is provided. This token is distinct from the bearer
/// token: it is single-use and time-boxed.
pub trait Confirmable {
    fn confirmation(&self) -> &ConfirmationDetails;
    fn confirmation_mut(&mut self) -> &mut ConfirmationDetails;

    /// Generate a fresh single-use token, replacing any pending one.
    fn set_confirmation_details(&mut self) {
        self.confirmation_mut().set_details();
    }

    /// Consume the pending token; returns the resource on success.
    fn confirm(
        &mut self,
        candidate: &str,
        config: &AuthConfig,
    ) -> Result<&Self, ConfirmationError>
    where
        Self: Sized,
    {
        self.confirmation_mut().confirm(candidate, config)?;
        Ok(self)
    }

    /// Whether the resource reached the terminal confirmed state.
    fn confirmed(&self) -> bool {
        self.confirmation().confirmed()
    }
}
