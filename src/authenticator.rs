use std::sync::Arc;
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::resource::Principal;
use crate::strategy::StrategyError;
use crate::strategy::StrategyRegistry;

/// Authentication run failure.
///
/// Carried as a value through the same channel as the happy path; the core
/// never retries on its own.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthenticationError {
    /// No registered strategy was applicable to the request.
    #[error("no authentication strategy was applicable")]
    NotAttempted,

    /// The failure of the last strategy that was valid and attempted.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Per-request orchestrator over the registered strategies.
///
/// Built fresh for every request (the middleware layer owns that wiring) and
/// owned exclusively by it. Only the registry and the configuration are
/// shared, and both are read-only at authentication time.
pub struct Authenticator {
    context: RequestContext,
    config: Arc<AuthConfig>,
    registry: Arc<RwLock<StrategyRegistry>>,
    current_user: Option<Principal>,
    error: Option<StrategyError>,
}

impl Authenticator {
    /// An authenticator over the process-wide registry.
    pub fn new(context: RequestContext, config: Arc<AuthConfig>) -> Self {
        Self::with_registry(context, config, StrategyRegistry::shared())
    }

    /// An authenticator over an explicit registry (isolated wiring, tests).
    pub fn with_registry(
        context: RequestContext,
        config: Arc<AuthConfig>,
        registry: Arc<RwLock<StrategyRegistry>>,
    ) -> Self {
        Self {
            context,
            config,
            registry,
            current_user: None,
            error: None,
        }
    }

    /// Run the registered strategies in registration order.
    ///
    /// Each strategy is built fresh, bound to the repository registered for
    /// its identifier (if any). Inapplicable strategies are skipped. The
    /// first strategy that is valid and succeeds wins and short-circuits the
    /// run; when every attempted strategy fails, the reported error is the
    /// failure of the *last* valid strategy attempted, and when none was
    /// applicable at all the run fails with [`AuthenticationError::NotAttempted`].
    pub fn authenticate(&mut self) -> Result<Principal, AuthenticationError> {
        self.current_user = None;
        self.error = None;

        let registry = self.registry.read().expect("strategy registry lock poisoned");
        for descriptor in registry.strategies() {
            let repository = registry.repository(descriptor.identifier()).cloned();
            let Some(strategy) =
                descriptor.build(self.context.clone(), repository, Arc::clone(&self.config))
            else {
                continue;
            };

            if !strategy.valid() {
                debug!(
                    strategy = descriptor.identifier(),
                    "skipping inapplicable strategy"
                );
                continue;
            }

            match strategy.authenticate() {
                Ok(user) => {
                    debug!(
                        strategy = descriptor.identifier(),
                        "authentication succeeded"
                    );
                    self.current_user = Some(user);
                    break;
                }
                Err(error) => {
                    debug!(
                        strategy = descriptor.identifier(),
                        %error,
                        "authentication attempt failed"
                    );
                    self.error = Some(error);
                }
            }
        }

        match &self.current_user {
            Some(user) => Ok(Arc::clone(user)),
            None => Err(self
                .error
                .clone()
                .map(AuthenticationError::Strategy)
                .unwrap_or(AuthenticationError::NotAttempted)),
        }
    }

    /// Whether the most recent run resolved a principal.
    pub fn authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// The principal resolved by the most recent run.
    pub fn current_user(&self) -> Option<&Principal> {
        self.current_user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::resource::Resource;
    use crate::strategy::SharedRepository;
    use crate::strategy::Strategy;
    use crate::strategy::StrategyDescriptor;
    use crate::strategy::StrategyOutcome;

    struct TestPrincipal {
        name: String,
    }

    impl Resource for TestPrincipal {
        fn password_digest(&self) -> Option<&str> {
            None
        }

        fn set_password_digest(&mut self, _digest: Option<String>) {}

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn principal(name: &str) -> Principal {
        Arc::new(TestPrincipal {
            name: name.to_string(),
        })
    }

    fn principal_name(principal: &Principal) -> &str {
        &principal
            .as_any()
            .downcast_ref::<TestPrincipal>()
            .expect("test principal")
            .name
    }

    /// Valid whenever an `email` param is present; succeeds only for the
    /// literal value `email`.
    struct EmailStrategy {
        context: RequestContext,
    }

    impl Strategy for EmailStrategy {
        fn build(
            context: RequestContext,
            _repository: Option<SharedRepository>,
            _config: Arc<AuthConfig>,
        ) -> Self {
            Self { context }
        }

        fn valid(&self) -> bool {
            self.context.param("email").is_some_and(|v| !v.is_empty())
        }

        fn authenticate(&self) -> StrategyOutcome {
            match self.context.param("email") {
                Some("email") => Ok(principal("email")),
                _ => Err(StrategyError::other("invalid_email", "invalid email")),
            }
        }
    }

    /// Valid whenever a `username` param is present; succeeds only for the
    /// literal value `username`.
    struct UsernameStrategy {
        context: RequestContext,
    }

    impl Strategy for UsernameStrategy {
        fn build(
            context: RequestContext,
            _repository: Option<SharedRepository>,
            _config: Arc<AuthConfig>,
        ) -> Self {
            Self { context }
        }

        fn valid(&self) -> bool {
            self.context
                .param("username")
                .is_some_and(|v| !v.is_empty())
        }

        fn authenticate(&self) -> StrategyOutcome {
            match self.context.param("username") {
                Some("username") => Ok(principal("username")),
                _ => Err(StrategyError::other("invalid_username", "invalid username")),
            }
        }
    }

    /// Always valid, always fails.
    struct FailedStrategy;

    impl Strategy for FailedStrategy {
        fn build(
            _context: RequestContext,
            _repository: Option<SharedRepository>,
            _config: Arc<AuthConfig>,
        ) -> Self {
            Self
        }

        fn authenticate(&self) -> StrategyOutcome {
            Err(StrategyError::other("failed", "failure content"))
        }
    }

    static NEVER_RUN_CALLS: AtomicUsize = AtomicUsize::new(0);

    /// Always valid, would succeed, but must never be reached in the
    /// short-circuit test.
    struct NeverRunStrategy;

    impl Strategy for NeverRunStrategy {
        fn build(
            _context: RequestContext,
            _repository: Option<SharedRepository>,
            _config: Arc<AuthConfig>,
        ) -> Self {
            Self
        }

        fn authenticate(&self) -> StrategyOutcome {
            NEVER_RUN_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(principal("never"))
        }
    }

    fn registry_of(descriptors: Vec<StrategyDescriptor>) -> Arc<RwLock<StrategyRegistry>> {
        let mut registry = StrategyRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor).expect("register");
        }
        Arc::new(RwLock::new(registry))
    }

    fn build_authenticator(
        params: &[(&str, &str)],
        registry: Arc<RwLock<StrategyRegistry>>,
    ) -> Authenticator {
        let context: RequestContext = params.iter().copied().collect();
        Authenticator::with_registry(context, Arc::new(AuthConfig::default()), registry)
    }

    #[test]
    fn test_first_valid_success_wins() {
        let registry = registry_of(vec![
            StrategyDescriptor::of::<EmailStrategy>(),
            StrategyDescriptor::of::<UsernameStrategy>(),
        ]);
        let mut authenticator = build_authenticator(&[("email", "email")], registry);

        let user = authenticator.authenticate().expect("authenticate");
        assert_eq!(principal_name(&user), "email");
        assert!(authenticator.authenticated());
        assert_eq!(
            authenticator.current_user().map(principal_name),
            Some("email")
        );
    }

    #[test]
    fn test_later_strategies_never_run_after_a_success() {
        NEVER_RUN_CALLS.store(0, Ordering::SeqCst);
        let registry = registry_of(vec![
            StrategyDescriptor::of::<FailedStrategy>(),
            StrategyDescriptor::of::<EmailStrategy>(),
            StrategyDescriptor::of::<NeverRunStrategy>(),
        ]);
        let mut authenticator = build_authenticator(&[("email", "email")], registry);

        let user = authenticator.authenticate().expect("authenticate");
        assert_eq!(principal_name(&user), "email");
        assert_eq!(NEVER_RUN_CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_earlier_failures_still_try_later_strategies() {
        // Order matters.
        let registry = registry_of(vec![
            StrategyDescriptor::of::<UsernameStrategy>(),
            StrategyDescriptor::of::<FailedStrategy>(),
            StrategyDescriptor::of::<EmailStrategy>(),
        ]);
        let mut authenticator =
            build_authenticator(&[("username", "wrong"), ("email", "email")], registry);

        assert!(authenticator.authenticate().is_ok());
    }

    #[test]
    fn test_all_invalid_reports_not_attempted() {
        let registry = registry_of(vec![
            StrategyDescriptor::of::<EmailStrategy>(),
            StrategyDescriptor::of::<UsernameStrategy>(),
        ]);
        let mut authenticator = build_authenticator(&[("phone", "+2010")], registry);

        assert_eq!(
            authenticator.authenticate().err(),
            Some(AuthenticationError::NotAttempted)
        );
        assert!(!authenticator.authenticated());
        assert!(authenticator.current_user().is_none());
    }

    #[test]
    fn test_reports_last_valid_strategy_failure() {
        // Order matters: the email strategy fails first, then the
        // always-valid strategy fails last and its error must win.
        let registry = registry_of(vec![
            StrategyDescriptor::of::<UsernameStrategy>(),
            StrategyDescriptor::of::<EmailStrategy>(),
            StrategyDescriptor::of::<FailedStrategy>(),
        ]);
        let mut authenticator = build_authenticator(&[("email", "invalid")], registry);

        assert_eq!(
            authenticator.authenticate().err(),
            Some(AuthenticationError::Strategy(StrategyError::other(
                "failed",
                "failure content"
            )))
        );
    }

    #[test]
    fn test_error_state_resets_between_runs() {
        let registry = registry_of(vec![
            StrategyDescriptor::of::<FailedStrategy>(),
            StrategyDescriptor::of::<UsernameStrategy>(),
        ]);
        let mut authenticator = build_authenticator(&[("username", "invalid")], registry.clone());
        assert_eq!(
            authenticator.authenticate().err(),
            Some(AuthenticationError::Strategy(StrategyError::other(
                "invalid_username",
                "invalid username"
            )))
        );

        registry.write().expect("write lock").clear();
        registry
            .write()
            .expect("write lock")
            .register(StrategyDescriptor::of::<EmailStrategy>())
            .expect("register");

        // No strategy is valid now, so the previous error must not leak.
        let mut authenticator = build_authenticator(&[("phone", "+2010")], registry);
        assert_eq!(
            authenticator.authenticate().err(),
            Some(AuthenticationError::NotAttempted)
        );
    }

    #[test]
    fn test_authenticated_is_false_before_any_run() {
        let registry = registry_of(vec![StrategyDescriptor::of::<EmailStrategy>()]);
        let authenticator = build_authenticator(&[("email", "email")], registry);

        assert!(!authenticator.authenticated());
        assert!(authenticator.current_user().is_none());
    }

    #[test]
    fn test_success_then_failure_clears_current_user() {
        let registry = registry_of(vec![StrategyDescriptor::of::<EmailStrategy>()]);
        let mut authenticator = build_authenticator(&[("email", "email")], registry.clone());
        assert!(authenticator.authenticate().is_ok());
        assert!(authenticator.authenticated());

        // Re-run the same authenticator after the registry was emptied: the
        // stale principal from the first run must not survive.
        registry.write().expect("write lock").clear();
        assert_eq!(
            authenticator.authenticate().err(),
            Some(AuthenticationError::NotAttempted)
        );
        assert!(!authenticator.authenticated());
        assert!(authenticator.current_user().is_none());
    }
}
