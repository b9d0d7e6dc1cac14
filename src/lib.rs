//! Rule-based URL routing library.
//!
//! Decides which handler application should receive an incoming URL from an
//! ordered, hot-reloadable rule set.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RoutingConfig;
pub use dispatch::Dispatcher;
pub use lifecycle::Shutdown;
pub use routing::{HandlerId, RoutingEngine, RuleSet};
