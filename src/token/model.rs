use serde_json::Map;
use serde_json::Value;

use super::claims::Claims;
use super::claims::CLAIM_KEYS;
use crate::config::TokenConfig;

/// Immutable-after-construction bearer token: custom payload, header
/// overrides, and the fixed claim set, kept disjoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    payload: Map<String, Value>,
    header: Map<String, Value>,
    claims: Claims,
}

impl Token {
    /// A token with exactly the given parts. Unset claims stay unset: no
    /// defaulting, so a decode/inspect round-trip cannot grow surprise
    /// claims.
    pub fn new(payload: Map<String, Value>, header: Map<String, Value>, claims: Claims) -> Self {
        Self {
            payload,
            header,
            claims,
        }
    }

    /// A token carrying only custom payload.
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        Self::new(payload, Map::new(), Claims::new())
    }

    /// A token carrying only claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self::new(Map::new(), Map::new(), claims)
    }

    /// A token whose unset claims are filled from the signing configuration;
    /// see [`Claims::with_defaults`].
    pub fn with_claim_defaults(
        payload: Map<String, Value>,
        header: Map<String, Value>,
        claims: Claims,
        config: &TokenConfig,
    ) -> Self {
        Self {
            payload,
            header,
            claims: claims.with_defaults(config),
        }
    }

    /// Rebuild a token from a decoded wire payload and header.
    ///
    /// The seven recognized claim keys are split out of the payload;
    /// everything else stays custom payload. No defaulting is applied.
    pub fn from_decoded(mut payload: Map<String, Value>, header: Map<String, Value>) -> Self {
        let claims = Claims::from_map(&payload);
        for key in CLAIM_KEYS {
            payload.remove(key);
        }
        Self {
            payload,
            header,
            claims,
        }
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The set claims as a map; absent claims are omitted.
    pub fn claims_map(&self) -> Map<String, Value> {
        self.claims.to_map()
    }
}
