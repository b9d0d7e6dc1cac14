//! URL dispatch: pick a handler and hand the URL over.
//!
//! # Data Flow
//! ```text
//! URL (argument, stdin line)
//!     → Dispatcher::handle_url
//!     → RoutingEngine::resolve (rule, else rule-file default)
//!     → caller default if still empty
//!     → HandlerInvoker::invoke
//!
//! Reload (startup, watcher, manual):
//!     RuleSetSource::load
//!     → Ok: RuleSet::from_config → set_rule_set, clear error
//!     → Err: keep last-known-good, remember error
//! ```

pub mod invoker;
pub mod session;

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::config::{ConfigError, ConfigUpdate, RoutingConfig, RuleSetSource};
use crate::observability::metrics;
use crate::routing::{HandlerId, RoutingEngine, RuleSet};

pub use invoker::{HandlerInvoker, StdoutInvoker};

/// True for URLs worth dispatching when they arrive as process arguments.
pub fn is_dispatchable(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

/// Ties rule loading, resolution and invocation together.
pub struct Dispatcher {
    engine: Arc<RoutingEngine>,
    source: Arc<dyn RuleSetSource>,
    invoker: Arc<dyn HandlerInvoker>,
    caller_default: HandlerId,
    config_error: ArcSwapOption<String>,
    reload_lock: Mutex<()>,
}

impl Dispatcher {
    /// Create a dispatcher with an empty rule set. Call [`reload`](Self::reload)
    /// to populate it.
    pub fn new(
        source: Arc<dyn RuleSetSource>,
        invoker: Arc<dyn HandlerInvoker>,
        caller_default: impl Into<HandlerId>,
    ) -> Self {
        Self::with_engine(Arc::new(RoutingEngine::default()), source, invoker, caller_default)
    }

    pub fn with_engine(
        engine: Arc<RoutingEngine>,
        source: Arc<dyn RuleSetSource>,
        invoker: Arc<dyn HandlerInvoker>,
        caller_default: impl Into<HandlerId>,
    ) -> Self {
        Self {
            engine,
            source,
            invoker,
            caller_default: caller_default.into(),
            config_error: ArcSwapOption::empty(),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &Arc<RoutingEngine> {
        &self.engine
    }

    /// Resolve `url` and invoke the chosen handler.
    ///
    /// Returns the handler invoked, or an empty id when neither the rules
    /// nor the caller default named one (nothing is invoked then).
    pub fn handle_url(&self, url: &str) -> HandlerId {
        let handler = self.resolve(url);
        if handler.is_empty() {
            tracing::warn!(url = %url, "No handler configured for URL");
            return handler;
        }

        tracing::info!(url = %url, handler = %handler, "Dispatching URL");
        self.invoker.invoke(&handler, url);
        handler
    }

    /// Resolve without invoking: rules, rule-file default, then caller default.
    ///
    /// A matching rule with an empty handler defers to the defaults.
    pub fn resolve(&self, url: &str) -> HandlerId {
        let rule_set = self.engine.snapshot();
        self.engine
            .resolve_in(&rule_set, url)
            .into_handler()
            .or(rule_set.fallback())
            .or(&self.caller_default)
    }

    /// Reload rules from the source.
    ///
    /// On failure the installed rule set is left as it was.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let update = self.source.load();
        self.install(update)
    }

    /// Install an update produced elsewhere (e.g. by the file watcher).
    pub fn apply(&self, update: ConfigUpdate) -> Result<(), ConfigError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.install(update)
    }

    fn install(&self, update: ConfigUpdate) -> Result<(), ConfigError> {
        match update {
            Ok(config) => {
                self.install_config(&config);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    source = %self.source.describe(),
                    error = %e,
                    "Rule reload failed; keeping current rule set"
                );
                self.config_error.store(Some(Arc::new(e.to_string())));
                metrics::record_reload(false);
                Err(e)
            }
        }
    }

    fn install_config(&self, config: &RoutingConfig) {
        let rule_set = RuleSet::from_config(config);
        tracing::info!(
            source = %self.source.describe(),
            rules = rule_set.len(),
            default = %rule_set.fallback(),
            "Rule set loaded"
        );
        self.engine.set_rule_set(rule_set);
        self.config_error.store(None);
        metrics::record_reload(true);
    }

    /// Message of the last failed reload, cleared by the next success.
    pub fn config_error(&self) -> Option<String> {
        self.config_error.load_full().map(|e| e.as_ref().clone())
    }
}
