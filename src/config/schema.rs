//! Configuration schema definitions.
//!
//! This module defines the persisted rule file. All types derive Serde
//! traits; every field is optional and unknown fields are ignored.
//!
//! The older `browsers` / `patterns` / `browserURL` / `defaultBrowserURL`
//! spellings are accepted on read so existing files keep working.

use serde::{Deserialize, Deserializer, Serialize};

/// Root of the persisted rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Handler used when no rule matches.
    #[serde(alias = "defaultBrowserURL", deserialize_with = "null_as_default")]
    pub default_handler_target: String,

    /// Rules, in priority order.
    #[serde(alias = "browsers", deserialize_with = "null_as_default")]
    pub rules: Vec<RuleConfig>,
}

/// One persisted rule record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleConfig {
    /// Case-insensitive substrings.
    #[serde(alias = "patterns", deserialize_with = "null_as_default")]
    pub literals: Vec<String>,

    /// Regular expressions, matched case-sensitively against the raw URL.
    #[serde(deserialize_with = "null_as_default")]
    pub regex_patterns: Vec<String>,

    /// Destination handler (e.g. "/Applications/Firefox.app").
    #[serde(alias = "browserURL", deserialize_with = "null_as_default")]
    pub handler_target: String,
}

impl RuleConfig {
    pub fn new(literals: &[&str], regex_patterns: &[&str], handler_target: &str) -> Self {
        Self {
            literals: literals.iter().map(|s| s.to_string()).collect(),
            regex_patterns: regex_patterns.iter().map(|s| s.to_string()).collect(),
            handler_target: handler_target.to_string(),
        }
    }
}

// JSON files written by hand often carry `null` for empty lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
