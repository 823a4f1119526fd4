use thiserror::Error;

/// Configuration errors raised synchronously at registration time.
///
/// These are programmer-misuse conditions: they fail the registration call
/// and are surfaced directly to the integrator, never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// The descriptor was not derived through the `Strategy` capability's
    /// naming convention.
    #[error("authentication strategies must derive their descriptor from the Strategy capability; {0:?} is not a valid identifier")]
    InvalidStrategyBase(String),

    /// The descriptor carries no `authenticate` builder.
    #[error("strategy {0:?} needs to provide an authenticate implementation")]
    InvalidStrategyImplementation(String),

    #[error("couldn't find strategy {0:?}")]
    StrategyNotFound(String),
}

/// Typed failure produced by a strategy's authentication attempt.
///
/// Always carried as a value through the authentication result channel,
/// never raised past the authenticator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StrategyError {
    /// No resource matched the identifying attributes.
    #[error("resource was not found")]
    ResourceNotFound,

    /// The resource rejected the presented credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Strategy-specific failure payload.
    #[error("{message}")]
    Other { kind: String, message: String },
}

impl StrategyError {
    /// Stable machine-readable kind of the failure.
    pub fn kind(&self) -> &str {
        match self {
            Self::ResourceNotFound => "resource_not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Other { kind, .. } => kind,
        }
    }

    /// Build a strategy-specific failure.
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
