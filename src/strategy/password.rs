use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::context::RequestContext;

use super::SharedRepository;
use super::Strategy;
use super::StrategyError;
use super::StrategyOutcome;

/// Password authentication against a resource looked up by its configured
/// identifier fields (e.g. email, username).
pub struct PasswordStrategy {
    context: RequestContext,
    repository: Option<SharedRepository>,
    config: Arc<AuthConfig>,
}

impl PasswordStrategy {
    /// The attributes identifying the resource: every configured identifier
    /// field present in the request with a non-empty value.
    fn identifying_params(&self) -> HashMap<String, String> {
        self.config
            .resource_identifiers
            .iter()
            .filter_map(|field| {
                self.context
                    .param(field)
                    .filter(|value| !value.is_empty())
                    .map(|value| (field.clone(), value.to_string()))
            })
            .collect()
    }
}

impl Strategy for PasswordStrategy {
    fn build(
        context: RequestContext,
        repository: Option<SharedRepository>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            context,
            repository,
            config,
        }
    }

    /// Applicable only with a bound repository, at least one identifying
    /// attribute, and a non-empty password parameter.
    fn valid(&self) -> bool {
        self.repository.is_some()
            && !self.identifying_params().is_empty()
            && self
                .context
                .param("password")
                .is_some_and(|password| !password.is_empty())
    }

    fn authenticate(&self) -> StrategyOutcome {
        let repository = self
            .repository
            .as_ref()
            .ok_or(StrategyError::ResourceNotFound)?;
        let resource = repository
            .find_resource(&self.identifying_params())
            .ok_or(StrategyError::ResourceNotFound)?;

        let candidate = self.context.param("password").unwrap_or_default();
        resource.authenticate_password(candidate)?;
        Ok(resource)
    }
}
