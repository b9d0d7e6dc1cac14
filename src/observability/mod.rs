//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, config, dispatch produce:
//!     → logging.rs (structured log events, stderr + optional file)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → terminal / log file
//!     → Metrics endpoint (Prometheus scrape, serve mode only)
//! ```

pub mod logging;
pub mod metrics;
