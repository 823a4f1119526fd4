use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::RwLock;

use tracing::debug;

use super::errors::RegistryError;
use super::password::PasswordStrategy;
use super::SharedRepository;
use super::StrategyDescriptor;

/// Ordered mapping from strategy identifier to descriptor, plus the
/// identifier-to-repository bindings.
///
/// Registration order is the resolution order of the authenticator; an
/// overwrite keeps the original position. The process-wide instance behind
/// [`StrategyRegistry::shared`] is meant to be mutated at startup or in
/// controlled test setup only; mutating it concurrently with in-flight
/// authentication is unsafe without an external synchronization discipline
/// (e.g. a write lock held across the whole rollout).
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<StrategyDescriptor>,
    repositories: HashMap<String, SharedRepository>,
}

impl StrategyRegistry {
    /// An empty registry, for isolated wiring (tests, embedded setups).
    pub fn new() -> Self {
        Self::default()
    }

    /// The lazily initialized process-wide registry, seeded with the
    /// built-in password strategy.
    pub fn shared() -> Arc<RwLock<StrategyRegistry>> {
        static SHARED: OnceLock<Arc<RwLock<StrategyRegistry>>> = OnceLock::new();
        SHARED
            .get_or_init(|| {
                let mut registry = StrategyRegistry::new();
                // The descriptor is derived from the type, so this cannot fail.
                let _ = registry.register(StrategyDescriptor::of::<PasswordStrategy>());
                Arc::new(RwLock::new(registry))
            })
            .clone()
    }

    /// Validate and insert a strategy. Re-registering an identifier
    /// overwrites the entry but keeps its position.
    ///
    /// # Errors
    /// * `InvalidStrategyBase` - the identifier was not derived through the
    ///   Strategy capability's naming convention
    /// * `InvalidStrategyImplementation` - the descriptor carries no
    ///   `authenticate` builder
    pub fn register(
        &mut self,
        descriptor: StrategyDescriptor,
    ) -> Result<&StrategyDescriptor, RegistryError> {
        validate_descriptor(&descriptor)?;

        debug!(
            identifier = descriptor.identifier(),
            "registering authentication strategy"
        );

        let position = self
            .strategies
            .iter()
            .position(|existing| existing.identifier() == descriptor.identifier());
        let index = match position {
            Some(index) => {
                self.strategies[index] = descriptor;
                index
            }
            None => {
                self.strategies.push(descriptor);
                self.strategies.len() - 1
            }
        };
        Ok(&self.strategies[index])
    }

    /// Bind `repository` to a registered strategy, overwriting any prior
    /// binding for that identifier.
    ///
    /// # Errors
    /// * `StrategyNotFound` - `identifier` is not registered
    pub fn bind_repository(
        &mut self,
        repository: SharedRepository,
        identifier: &str,
    ) -> Result<(), RegistryError> {
        if !self
            .strategies
            .iter()
            .any(|descriptor| descriptor.identifier() == identifier)
        {
            return Err(RegistryError::StrategyNotFound(identifier.to_string()));
        }

        self.repositories.insert(identifier.to_string(), repository);
        Ok(())
    }

    /// Registered strategies, in registration order.
    pub fn strategies(&self) -> &[StrategyDescriptor] {
        &self.strategies
    }

    /// Current repository bindings.
    pub fn repositories(&self) -> &HashMap<String, SharedRepository> {
        &self.repositories
    }

    /// The repository bound to `identifier`, if any.
    pub fn repository(&self, identifier: &str) -> Option<&SharedRepository> {
        self.repositories.get(identifier)
    }

    /// Drop all strategies and bindings. Intended for isolated test runs.
    pub fn clear(&mut self) {
        self.strategies.clear();
        self.repositories.clear();
    }
}

fn validate_descriptor(descriptor: &StrategyDescriptor) -> Result<(), RegistryError> {
    let identifier = descriptor.identifier();
    let well_formed = !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !well_formed {
        return Err(RegistryError::InvalidStrategyBase(identifier.to_string()));
    }
    if !descriptor.has_builder() {
        return Err(RegistryError::InvalidStrategyImplementation(
            identifier.to_string(),
        ));
    }
    Ok(())
}
