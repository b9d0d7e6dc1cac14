//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! serve:
//!     Load rules → Start watcher (optional) → Read URLs
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C or end of input → Stop reading → Drop watcher → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
