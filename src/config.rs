use std::env;

use config::Config as ConfigLoader;
use config::ConfigError;
use config::Environment;
use config::File;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// Signing algorithm for bearer tokens.
///
/// A closed set: three HMAC strengths, three RSA strengths, two ECDSA
/// strengths, plus an explicit no-signature sentinel for trusted internal
/// transport. With the sentinel configured, decode skips signature
/// verification but still verifies claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SigningAlgorithm {
    #[serde(rename = "HS256")]
    Hs256,
    #[serde(rename = "HS384")]
    Hs384,
    #[serde(rename = "HS512")]
    Hs512,
    #[serde(rename = "RS256")]
    Rs256,
    #[serde(rename = "RS384")]
    Rs384,
    #[serde(rename = "RS512")]
    Rs512,
    #[serde(rename = "ES256")]
    Es256,
    #[serde(rename = "ES384")]
    Es384,
    #[serde(rename = "none")]
    None,
}

impl SigningAlgorithm {
    /// The value carried in the wire header's `alg` field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::None => "none",
        }
    }

    /// Whether this is the explicit no-signature sentinel.
    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::None)
    }

    /// The corresponding `jsonwebtoken` algorithm; `None` for the unsigned
    /// sentinel, which never reaches the signing layer.
    pub(crate) fn to_jsonwebtoken(self) -> Option<Algorithm> {
        match self {
            Self::Hs256 => Some(Algorithm::HS256),
            Self::Hs384 => Some(Algorithm::HS384),
            Self::Hs512 => Some(Algorithm::HS512),
            Self::Rs256 => Some(Algorithm::RS256),
            Self::Rs384 => Some(Algorithm::RS384),
            Self::Rs512 => Some(Algorithm::RS512),
            Self::Es256 => Some(Algorithm::ES256),
            Self::Es384 => Some(Algorithm::ES384),
            Self::None => Option::None,
        }
    }
}

impl Default for SigningAlgorithm {
    fn default() -> Self {
        Self::Hs256
    }
}

/// Signing configuration, read by token default-derivation and the codec.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub algorithm: SigningAlgorithm,
    /// HMAC secret or PEM-encoded key material, depending on the algorithm.
    pub secret: String,
    /// Default `iss` claim, and the expected issuer on decode.
    pub issuer: Option<String>,
    /// Default `aud` claim, and the expected audience on decode.
    pub audience: Option<String>,
    /// Lifetime of the default `exp` claim, relative to `iat`.
    pub expiry_seconds: i64,
    /// Grace period for expiry checks, tolerating clock skew.
    pub leeway_seconds: i64,
    pub verify_issuer: bool,
    pub verify_jti: bool,
    pub verify_audience: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::default(),
            secret: String::new(),
            issuer: None,
            audience: None,
            expiry_seconds: 3600,
            leeway_seconds: 30,
            verify_issuer: true,
            verify_jti: true,
            verify_audience: true,
        }
    }
}

/// Process-wide configuration surface.
///
/// Built once at startup (or in controlled test setup) and injected as
/// `Arc<AuthConfig>` into everything that reads it. Updating it concurrently
/// with in-flight authentication is not supported.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Request parameters that may identify a resource (e.g. email,
    /// username).
    pub resource_identifiers: Vec<String>,
    /// bcrypt cost factor used when hashing passwords.
    pub encryption_cost: u32,
    /// How long a confirmation token stays consumable.
    pub confirmation_expiry_seconds: i64,
    pub token: TokenConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            resource_identifiers: vec!["email".to_string()],
            encryption_cost: 11,
            confirmation_expiry_seconds: 86_400,
            token: TokenConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__TOKEN__SECRET, AUTH__ENCRYPTION_COST, ...)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// Fields absent from every source fall back to their defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("auth").separator("__"))
            .build()?;

        let config: AuthConfig = configuration.try_deserialize()?;

        Ok(config)
    }
}
