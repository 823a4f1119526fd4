use bcrypt::hash;
use bcrypt::verify;
use bcrypt::DEFAULT_COST;

use super::errors::PasswordError;

/// Cost-parameterized one-way password hashing.
///
/// Thin wrapper over bcrypt; the cost factor normally comes from the process
/// configuration (`AuthConfig::encryption_cost`).
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password into a modular-crypt digest with a random
    /// salt.
    ///
    /// # Errors
    /// * `HashingFailed` - cost factor out of range or hashing failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Compare a candidate password against a stored digest.
    ///
    /// # Errors
    /// * `VerificationFailed` - the digest is not a parseable bcrypt digest
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        verify(password, digest).map_err(|e| PasswordError::VerificationFailed(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost; keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(TEST_COST);
        let digest = hasher.hash("my_secure_password").expect("hash");

        assert!(hasher.verify("my_secure_password", &digest).expect("verify"));
        assert!(!hasher.verify("wrong_password", &digest).expect("verify"));
    }

    #[test]
    fn test_digests_are_salted() {
        let hasher = PasswordHasher::new(TEST_COST);
        let first = hasher.hash("password").expect("hash");
        let second = hasher.hash("password").expect("hash");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        let hasher = PasswordHasher::new(TEST_COST);
        let result = hasher.verify("password", "not_a_bcrypt_digest");

        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_out_of_range_cost_is_an_error() {
        let hasher = PasswordHasher::new(1);
        let result = hasher.hash("password");

        assert!(matches!(result, Err(PasswordError::HashingFailed(_))));
    }
}
