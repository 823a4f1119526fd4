use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;

use crate::config::TokenConfig;

/// The claim keys recognized by the token model. Everything else in a wire
/// payload is custom payload.
pub const CLAIM_KEYS: [&str; 7] = ["aud", "iss", "iat", "exp", "jti", "sub", "exp_leeway"];

/// The fixed claim set of a bearer token.
///
/// Absent claims stay `None` and are omitted from every serialized view,
/// never emitted as null placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Audience(s) the token is intended for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Vec<String>>,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued at (unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Unique token identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Grace period (seconds) granted on expiry checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_leeway: Option<i64>,
}

impl Claims {
    /// Empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set audience list.
    pub fn with_audience(mut self, aud: Vec<String>) -> Self {
        self.aud = Some(aud);
        self
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Set issued at (unix seconds).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set expiration (unix seconds).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set unique token id.
    pub fn with_jti(mut self, jti: impl ToString) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Set the expiry grace period.
    pub fn with_exp_leeway(mut self, leeway: i64) -> Self {
        self.exp_leeway = Some(leeway);
        self
    }

    /// Extract the recognized claims from a decoded wire payload.
    ///
    /// A scalar `aud` is wrapped into a one-element list; claims with
    /// unusable types are treated as absent.
    pub fn from_map(payload: &Map<String, Value>) -> Self {
        Self {
            aud: payload.get("aud").and_then(audience_list),
            iss: string_claim(payload, "iss"),
            iat: integer_claim(payload, "iat"),
            exp: integer_claim(payload, "exp"),
            jti: string_claim(payload, "jti"),
            sub: string_claim(payload, "sub"),
            exp_leeway: integer_claim(payload, "exp_leeway"),
        }
    }

    /// Fill every unset claim with its configured default.
    ///
    /// `iat` resolves first so `exp` and `jti` derive from the resolved
    /// value. `sub` has no default; `aud` stays absent when no audience is
    /// configured.
    pub fn with_defaults(mut self, config: &TokenConfig) -> Self {
        let issued_at = self.iat.unwrap_or_else(|| Utc::now().timestamp());
        self.iat = Some(issued_at);
        self.aud = self
            .aud
            .or_else(|| config.audience.clone().map(|audience| vec![audience]));
        self.iss = self.iss.or_else(|| config.issuer.clone());
        self.exp = self
            .exp
            .or_else(|| Some(Self::expiration_time(issued_at, config)));
        self.jti = self
            .jti
            .or_else(|| Some(Self::new_jti(&config.secret, issued_at)));
        self.exp_leeway = self.exp_leeway.or(Some(config.leeway_seconds));
        self
    }

    /// Default expiry for a token issued at `issued_at`.
    pub fn expiration_time(issued_at: i64, config: &TokenConfig) -> i64 {
        issued_at + config.expiry_seconds
    }

    /// Deterministic token id: lowercase hex SHA-256 of
    /// `"{secret}:{issued_at}"`. Stable for a given secret and issue second,
    /// deliberately not random, so token minting is reproducible.
    pub fn new_jti(secret: &str, issued_at: i64) -> String {
        hex::encode(Sha256::digest(format!("{secret}:{issued_at}")))
    }

    /// Projection of the set claims; absent fields are omitted.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Claims always serializes to an object.
            _ => Map::new(),
        }
    }
}

fn string_claim(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

fn integer_claim(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

fn audience_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(audience) => Some(vec![audience.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}
