//! Pluggable authentication strategies.
//!
//! A strategy is one unit of authentication logic bound to one identity
//! repository. Strategies are registered once, usually at process startup,
//! and a fresh instance is built for every authentication attempt; the
//! [`registry::StrategyRegistry`] keeps the registration order, which is the
//! order the authenticator resolves them in.

pub mod errors;
pub mod password;
pub mod registry;

pub use errors::RegistryError;
pub use errors::StrategyError;
pub use password::PasswordStrategy;
pub use registry::StrategyRegistry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::resource::Principal;

/// An identity repository: maps identifying attributes to at most one
/// resource.
///
/// Lookups must be safe with partial or empty attribute maps. Any I/O a
/// repository performs is the only suspension point of an authentication
/// run; the core imposes no timeout of its own and propagates whatever
/// failure surfaces as a missing resource.
pub trait Repository: Send + Sync {
    fn find_resource(&self, attributes: &HashMap<String, String>) -> Option<Principal>;
}

pub type SharedRepository = Arc<dyn Repository>;

/// Outcome of one strategy's authentication attempt.
pub type StrategyOutcome = Result<Principal, StrategyError>;

/// One unit of authentication logic, bound to one repository.
///
/// Implementations are built per attempt from the request context, the
/// repository bound to their identifier (if any) and the process
/// configuration, and must stay stateless across requests.
pub trait Strategy: Send {
    /// Build an instance for one authentication attempt.
    fn build(
        context: RequestContext,
        repository: Option<SharedRepository>,
        config: Arc<AuthConfig>,
    ) -> Self
    where
        Self: Sized;

    /// Cheap applicability pre-check. Strategies that are not valid are
    /// skipped without invoking [`Strategy::authenticate`].
    fn valid(&self) -> bool {
        true
    }

    /// Attempt authentication.
    fn authenticate(&self) -> StrategyOutcome;
}

/// Builder invoked by the authenticator to construct a strategy instance
/// for one attempt.
pub type StrategyBuilder = Arc<
    dyn Fn(RequestContext, Option<SharedRepository>, Arc<AuthConfig>) -> Box<dyn Strategy>
        + Send
        + Sync,
>;

/// Registration-time description of a strategy: the identifier derived from
/// its type plus the builder the authenticator invokes per attempt.
#[derive(Clone)]
pub struct StrategyDescriptor {
    identifier: String,
    builder: Option<StrategyBuilder>,
}

impl StrategyDescriptor {
    /// Describe a strategy type, deriving the identifier from the type name
    /// (`PasswordStrategy` becomes `"password"`).
    pub fn of<S: Strategy + 'static>() -> Self {
        Self {
            identifier: derive_identifier(std::any::type_name::<S>()),
            builder: Some(Arc::new(|context, repository, config| {
                Box::new(S::build(context, repository, config))
            })),
        }
    }

    /// Hand-assembled descriptor, e.g. from a generated registration table.
    /// Goes through the same validation as [`StrategyDescriptor::of`] when
    /// registered.
    pub fn raw(identifier: impl Into<String>, builder: Option<StrategyBuilder>) -> Self {
        Self {
            identifier: identifier.into(),
            builder,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn has_builder(&self) -> bool {
        self.builder.is_some()
    }

    /// Build a fresh strategy instance for one attempt.
    pub(crate) fn build(
        &self,
        context: RequestContext,
        repository: Option<SharedRepository>,
        config: Arc<AuthConfig>,
    ) -> Option<Box<dyn Strategy>> {
        self.builder
            .as_ref()
            .map(|builder| builder(context, repository, config))
    }
}

impl fmt::Debug for StrategyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyDescriptor")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// `some::path::PasswordStrategy` becomes `password`.
fn derive_identifier(type_name: &str) -> String {
    let name = type_name.rsplit("::").next().unwrap_or(type_name);
    name.trim_end_matches("Strategy").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_derivation() {
        assert_eq!(derive_identifier("PasswordStrategy"), "password");
        assert_eq!(
            derive_identifier("auth_core::strategy::password::PasswordStrategy"),
            "password"
        );
        assert_eq!(derive_identifier("ApiKeyStrategy"), "apikey");
        assert_eq!(derive_identifier("Strategy"), "");
    }

    #[test]
    fn test_descriptor_of_builtin_strategy() {
        let descriptor = StrategyDescriptor::of::<PasswordStrategy>();

        assert_eq!(descriptor.identifier(), "password");
        assert!(descriptor.has_builder());
    }

    #[test]
    fn test_raw_descriptor_may_lack_a_builder() {
        let descriptor = StrategyDescriptor::raw("custom", None);

        assert_eq!(descriptor.identifier(), "custom");
        assert!(!descriptor.has_builder());
    }
}
