//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming URL
//!     → engine.rs (load current RuleSet snapshot)
//!     → rule.rs literals (case-insensitive substring)
//!     → cache.rs regexes (compile once, match raw URL)
//!     → Return: rule handler, or fallback, or empty
//!
//! Reload:
//!     RoutingConfig
//!     → RuleSet::from_config (lower-case literals, keep order)
//!     → RoutingEngine::set_rule_set (atomic pointer swap)
//! ```
//!
//! # Design Decisions
//! - Rule sets are immutable; reload swaps the whole set
//! - Deterministic: same rule set and URL always give the same handler
//! - First match wins, literals before regexes within a rule
//! - Invalid regexes never error, they just never match

pub mod cache;
pub mod engine;
pub mod rule;

pub use cache::{CompiledPattern, PatternCache};
pub use engine::{Clause, Resolution, RoutingEngine};
pub use rule::{HandlerId, Rule, RuleSet};
