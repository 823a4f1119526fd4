use std::collections::HashMap;
use std::sync::Arc;

use auth_core::AuthConfig;
use auth_core::Confirmable;
use auth_core::ConfirmationDetails;
use auth_core::Principal;
use auth_core::Repository;
use auth_core::Resource;

/// Test double for a persisted user record.
#[derive(Debug)]
pub struct TestUser {
    pub email: String,
    pub username: String,
    digest: Option<String>,
    confirmation: ConfirmationDetails,
}

impl TestUser {
    pub fn new(email: &str, username: &str, password: &str, config: &AuthConfig) -> Self {
        let mut user = Self {
            email: email.to_string(),
            username: username.to_string(),
            digest: None,
            confirmation: ConfirmationDetails::default(),
        };
        user.set_password(password, config).expect("test password");
        user
    }
}

impl Resource for TestUser {
    fn password_digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    fn set_password_digest(&mut self, digest: Option<String>) {
        self.digest = digest;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Confirmable for TestUser {
    fn confirmation(&self) -> &ConfirmationDetails {
        &self.confirmation
    }

    fn confirmation_mut(&mut self) -> &mut ConfirmationDetails {
        &mut self.confirmation
    }
}

/// In-memory repository matching users on every provided attribute.
#[derive(Default)]
pub struct InMemoryRepository {
    users: Vec<Arc<TestUser>>,
}

impl InMemoryRepository {
    pub fn with_users(users: Vec<Arc<TestUser>>) -> Self {
        Self { users }
    }
}

impl Repository for InMemoryRepository {
    fn find_resource(&self, attributes: &HashMap<String, String>) -> Option<Principal> {
        if attributes.is_empty() {
            return None;
        }
        self.users
            .iter()
            .find(|user| {
                attributes.iter().all(|(field, value)| match field.as_str() {
                    "email" => user.email == *value,
                    "username" => user.username == *value,
                    _ => false,
                })
            })
            .map(|user| Arc::clone(user) as Principal)
    }
}

pub fn test_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.encryption_cost = 4; // keep bcrypt fast in tests
    config.resource_identifiers = vec!["email".to_string(), "username".to_string()];
    config.token.secret = "integration-test-secret-material!".to_string();
    config.token.issuer = Some("auth-core-tests".to_string());
    config.token.audience = Some("api".to_string());
    config
}
