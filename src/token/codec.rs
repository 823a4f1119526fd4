use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::crypto::sign;
use jsonwebtoken::crypto::verify;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use super::claims::Claims;
use super::errors::TokenError;
use super::model::Token;
use crate::config::SigningAlgorithm;
use crate::config::TokenConfig;

/// Stateless encode/decode over [`Token`], parameterized by the process-wide
/// signing configuration.
///
/// The wire format is the standard three-part framing: base64url header,
/// base64url payload (claims merged into the custom payload), base64url
/// signature (empty under the unsigned sentinel). No other component touches
/// the wire format.
pub struct TokenCodec {
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Encode and sign a token.
    ///
    /// The wire payload is the custom payload with the set claims projected
    /// over it (claims win on key collision); the wire header is the
    /// implicit `{"typ","alg"}` header with the token's header entries
    /// merged over it, `alg` always reflecting the configured algorithm.
    ///
    /// # Errors
    /// * `EncodingFailed` - key material unusable for the configured
    ///   algorithm, or malformed claim values after the merge
    pub fn encode(&self, token: &Token) -> Result<String, TokenError> {
        let payload = self.wire_payload(token)?;
        let header = self.wire_header(token);

        let signing_input = format!(
            "{}.{}",
            encode_segment(&Value::Object(header))?,
            encode_segment(&Value::Object(payload))?
        );

        let Some(algorithm) = self.config.algorithm.to_jsonwebtoken() else {
            // Unsigned sentinel: empty signature segment.
            return Ok(format!("{signing_input}."));
        };

        let signature = sign(signing_input.as_bytes(), &self.encoding_key()?, algorithm)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Decode and verify a token using the configured audience expectations.
    pub fn decode(&self, encoded: &str) -> Result<Token, TokenError> {
        self.decode_with_audience(
            encoded,
            self.config.audience.as_deref(),
            self.config.verify_audience,
        )
    }

    /// Decode and verify, overriding the expected audience and whether to
    /// enforce it.
    ///
    /// Signature verification is skipped only under the unsigned sentinel;
    /// claim verification (expiry with the configured leeway, issuer
    /// equality, audience membership and `jti` presence, each per its
    /// toggle) always runs.
    pub fn decode_with_audience(
        &self,
        encoded: &str,
        audience: Option<&str>,
        verify_audience: bool,
    ) -> Result<Token, TokenError> {
        let (header_segment, payload_segment, signature) = split_token(encoded)?;

        if let Some(algorithm) = self.config.algorithm.to_jsonwebtoken() {
            let message_length = header_segment.len() + 1 + payload_segment.len();
            let message = &encoded[..message_length];
            let valid = verify(
                signature,
                message.as_bytes(),
                &self.decoding_key()?,
                algorithm,
            )
            .map_err(|e| TokenError::DecodingFailed(e.to_string()))?;
            if !valid {
                return Err(TokenError::DecodingFailed(
                    "signature verification failed".to_string(),
                ));
            }
        }

        let header = decode_segment(header_segment)?;
        let payload = decode_segment(payload_segment)?;

        if !self.config.algorithm.is_unsigned() {
            let expected = self.config.algorithm.name();
            if header.get("alg").and_then(Value::as_str) != Some(expected) {
                return Err(TokenError::DecodingFailed(format!(
                    "expected {expected} signing algorithm"
                )));
            }
        }

        let claims = Claims::from_map(&payload);
        self.verify_claims(&claims, audience, verify_audience)?;

        Ok(Token::from_decoded(payload, header))
    }

    fn wire_payload(&self, token: &Token) -> Result<Map<String, Value>, TokenError> {
        let mut payload = token.payload().clone();
        for (key, value) in token.claims_map() {
            payload.insert(key, value);
        }

        for key in ["iat", "exp", "exp_leeway"] {
            if let Some(value) = payload.get(key) {
                if value.as_i64().is_none() {
                    return Err(TokenError::EncodingFailed(format!(
                        "claim {key:?} must be an integer"
                    )));
                }
            }
        }

        Ok(payload)
    }

    fn wire_header(&self, token: &Token) -> Map<String, Value> {
        let mut header = Map::new();
        header.insert("typ".to_string(), Value::String("JWT".to_string()));
        for (key, value) in token.header() {
            header.insert(key.clone(), value.clone());
        }
        // The configured algorithm always wins over a header override.
        header.insert(
            "alg".to_string(),
            Value::String(self.config.algorithm.name().to_string()),
        );
        header
    }

    fn encoding_key(&self) -> Result<EncodingKey, TokenError> {
        let secret = self.config.secret.as_bytes();
        match self.config.algorithm {
            SigningAlgorithm::Hs256 | SigningAlgorithm::Hs384 | SigningAlgorithm::Hs512 => {
                Ok(EncodingKey::from_secret(secret))
            }
            SigningAlgorithm::Rs256 | SigningAlgorithm::Rs384 | SigningAlgorithm::Rs512 => {
                EncodingKey::from_rsa_pem(secret)
                    .map_err(|e| TokenError::EncodingFailed(e.to_string()))
            }
            SigningAlgorithm::Es256 | SigningAlgorithm::Es384 => EncodingKey::from_ec_pem(secret)
                .map_err(|e| TokenError::EncodingFailed(e.to_string())),
            SigningAlgorithm::None => Err(TokenError::EncodingFailed(
                "the unsigned sentinel has no signing key".to_string(),
            )),
        }
    }

    fn decoding_key(&self) -> Result<DecodingKey, TokenError> {
        let secret = self.config.secret.as_bytes();
        match self.config.algorithm {
            SigningAlgorithm::Hs256 | SigningAlgorithm::Hs384 | SigningAlgorithm::Hs512 => {
                Ok(DecodingKey::from_secret(secret))
            }
            SigningAlgorithm::Rs256 | SigningAlgorithm::Rs384 | SigningAlgorithm::Rs512 => {
                DecodingKey::from_rsa_pem(secret)
                    .map_err(|e| TokenError::DecodingFailed(e.to_string()))
            }
            SigningAlgorithm::Es256 | SigningAlgorithm::Es384 => DecodingKey::from_ec_pem(secret)
                .map_err(|e| TokenError::DecodingFailed(e.to_string())),
            SigningAlgorithm::None => Err(TokenError::DecodingFailed(
                "the unsigned sentinel has no verification key".to_string(),
            )),
        }
    }

    fn verify_claims(
        &self,
        claims: &Claims,
        audience: Option<&str>,
        verify_audience: bool,
    ) -> Result<(), TokenError> {
        if let Some(exp) = claims.exp {
            let now = Utc::now().timestamp();
            if exp + self.config.leeway_seconds <= now {
                debug!(exp, now, "token expired beyond leeway");
                return Err(TokenError::TokenExpired);
            }
        }

        if self.config.verify_issuer {
            if let Some(expected) = self.config.issuer.as_deref() {
                if claims.iss.as_deref() != Some(expected) {
                    return Err(TokenError::InvalidIssuer {
                        expected: expected.to_string(),
                    });
                }
            }
        }

        if verify_audience {
            if let Some(expected) = audience {
                let member = claims
                    .aud
                    .as_ref()
                    .is_some_and(|audiences| audiences.iter().any(|a| a == expected));
                if !member {
                    return Err(TokenError::InvalidAudience {
                        expected: expected.to_string(),
                    });
                }
            }
        }

        if self.config.verify_jti && claims.jti.as_deref().map_or(true, str::is_empty) {
            return Err(TokenError::MissingClaim("jti".to_string()));
        }

        Ok(())
    }
}

fn split_token(encoded: &str) -> Result<(&str, &str, &str), TokenError> {
    let segments: Vec<&str> = encoded.split('.').collect();
    match segments.as_slice() {
        [header, payload, signature] => Ok((header, payload, signature)),
        _ => Err(TokenError::DecodingFailed(
            "token framing must have three segments".to_string(),
        )),
    }
}

fn encode_segment(value: &Value) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment(segment: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::DecodingFailed(e.to_string()))?;
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TokenError::DecodingFailed(
            "segment is not a JSON object".to_string(),
        )),
        Err(e) => Err(TokenError::DecodingFailed(e.to_string())),
    }
}
