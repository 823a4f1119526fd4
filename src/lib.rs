//! Pluggable authentication core.
//!
//! Decides whether a caller is an authenticated principal by running an
//! ordered set of interchangeable strategies against caller-supplied
//! identity repositories, and mints/verifies signed bearer tokens for
//! authenticated sessions:
//! - Strategy registry + per-request authenticator (first success wins and
//!   short-circuits; the last observed failure is reported)
//! - Token model and codec over a configurable signing setup
//! - Confirmation workflow (single-use, time-boxed proof of ownership)
//! - Password hashing (bcrypt) and the resource password capability
//!
//! The web/middleware layer that extracts request parameters, and any
//! persistence of resources, live outside this crate; it only consumes their
//! interfaces ([`RequestContext`], [`Repository`], [`Resource`]).
//!
//! # Examples
//!
//! ## Minting and verifying a bearer token
//! ```
//! use auth_core::{AuthConfig, Claims, Token, TokenCodec};
//!
//! let mut config = AuthConfig::default();
//! config.token.secret = "at_least_32_bytes_of_secret_material".to_string();
//!
//! let codec = TokenCodec::new(config.token.clone());
//! let token = Token::with_claim_defaults(
//!     Default::default(),
//!     Default::default(),
//!     Claims::new().with_subject("user123"),
//!     &config.token,
//! );
//!
//! let encoded = codec.encode(&token).unwrap();
//! let decoded = codec.decode(&encoded).unwrap();
//! assert_eq!(decoded.claims().sub.as_deref(), Some("user123"));
//! ```
//!
//! ## Authenticating a request
//! ```
//! use std::collections::HashMap;
//! use std::sync::{Arc, RwLock};
//!
//! use auth_core::{
//!     AuthConfig, Authenticator, PasswordStrategy, Principal, Repository, RequestContext,
//!     Resource, StrategyDescriptor, StrategyRegistry,
//! };
//!
//! struct User {
//!     digest: Option<String>,
//! }
//!
//! impl Resource for User {
//!     fn password_digest(&self) -> Option<&str> {
//!         self.digest.as_deref()
//!     }
//!     fn set_password_digest(&mut self, digest: Option<String>) {
//!         self.digest = digest;
//!     }
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//!
//! struct SingleUser(Principal);
//!
//! impl Repository for SingleUser {
//!     fn find_resource(&self, _attributes: &HashMap<String, String>) -> Option<Principal> {
//!         Some(Arc::clone(&self.0))
//!     }
//! }
//!
//! let mut config = AuthConfig::default();
//! config.encryption_cost = 4; // keep the example fast
//!
//! let mut user = User { digest: None };
//! user.set_password("s3cret", &config).unwrap();
//!
//! let mut registry = StrategyRegistry::new();
//! registry.register(StrategyDescriptor::of::<PasswordStrategy>()).unwrap();
//! registry
//!     .bind_repository(Arc::new(SingleUser(Arc::new(user))), "password")
//!     .unwrap();
//!
//! let context = RequestContext::from_iter([("email", "alice@example.com"), ("password", "s3cret")]);
//! let mut authenticator = Authenticator::with_registry(
//!     context,
//!     Arc::new(config),
//!     Arc::new(RwLock::new(registry)),
//! );
//!
//! assert!(authenticator.authenticate().is_ok());
//! assert!(authenticator.authenticated());
//! ```

pub mod authenticator;
pub mod config;
pub mod confirmable;
pub mod context;
pub mod password;
pub mod resource;
pub mod strategy;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
// `self::` keeps these from colliding with the `config` crate's name.
pub use self::config::AuthConfig;
pub use self::config::SigningAlgorithm;
pub use self::config::TokenConfig;
pub use confirmable::Confirmable;
pub use confirmable::ConfirmationDetails;
pub use confirmable::ConfirmationError;
pub use context::RequestContext;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use resource::Principal;
pub use resource::Resource;
pub use resource::ResourceError;
pub use strategy::PasswordStrategy;
pub use strategy::RegistryError;
pub use strategy::Repository;
pub use strategy::SharedRepository;
pub use strategy::Strategy;
pub use strategy::StrategyBuilder;
pub use strategy::StrategyDescriptor;
pub use strategy::StrategyError;
pub use strategy::StrategyOutcome;
pub use strategy::StrategyRegistry;
pub use token::Claims;
pub use token::Token;
pub use token::TokenCodec;
pub use token::TokenError;
