//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! rule file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (diagnostics, never fatal)
//!     → RoutingConfig
//!     → RuleSet::from_config → RoutingEngine
//!
//! On change:
//!     watcher.rs detects change
//!     → source.rs loads new config
//!     → dispatch installs it only if it loaded cleanly
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal files
//! - A failed load never replaces a working rule set

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, ConfigFormat};
pub use schema::{RoutingConfig, RuleConfig};
pub use source::{FileSource, RuleSetSource, StaticSource};
pub use watcher::{ConfigUpdate, ConfigWatcher};
