//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use link_router::config::{RoutingConfig, RuleConfig};
use link_router::routing::{Rule, RuleSet};

pub const CHROME: &str = "/Applications/Chrome.app";
pub const FIREFOX: &str = "/Applications/Firefox.app";
pub const SAFARI: &str = "/Applications/Safari.app";

/// Rule with literal clauses only.
pub fn literals(literals: &[&str], handler: &str) -> Rule {
    Rule::new(literals, Vec::<String>::new(), handler)
}

/// Rule with regex clauses only.
pub fn regexes(patterns: &[&str], handler: &str) -> Rule {
    Rule::new(Vec::<String>::new(), patterns.iter().map(|p| p.to_string()), handler)
}

/// The browser setup most tests start from.
pub fn browser_rules() -> RuleSet {
    RuleSet::new(
        vec![
            literals(&["github.com", "gitlab.com"], CHROME),
            literals(&["localhost"], FIREFOX),
            regexes(&[r"^https://.*\.internal\..*", r"^https://.*\.dev\.local"], FIREFOX),
            regexes(&[r".*\.staging\..*"], CHROME),
        ],
        SAFARI,
    )
}

pub fn config(rules: Vec<RuleConfig>, default: &str) -> RoutingConfig {
    RoutingConfig {
        default_handler_target: default.to_string(),
        rules,
    }
}

/// Write `config` as JSON to `dir/name` and return the path.
pub fn write_config(dir: &Path, name: &str, config: &RoutingConfig) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}
