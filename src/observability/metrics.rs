//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): lookups by outcome (rule, fallback, none)
//! - `router_pattern_compilations_total` (counter): regex compilations by result
//! - `router_reloads_total` (counter): rule reloads by result
//! - `router_rules` (gauge): rules in the installed rule set
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition only when an address is configured

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    ::metrics::counter!("router_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_pattern_compilation(ok: bool) {
    let result = if ok { "ok" } else { "failed" };
    ::metrics::counter!("router_pattern_compilations_total", "result" => result).increment(1);
}

pub fn record_reload(ok: bool) {
    let result = if ok { "ok" } else { "failed" };
    ::metrics::counter!("router_reloads_total", "result" => result).increment(1);
}

pub fn record_rule_count(rules: usize) {
    ::metrics::gauge!("router_rules").set(rules as f64);
}
