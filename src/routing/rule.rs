//! Rule model.
//!
//! # Responsibilities
//! - Name a destination (`HandlerId`)
//! - Hold one rule's literal and regex clauses
//! - Hold the ordered rule list plus fallback (`RuleSet`)
//!
//! # Design Decisions
//! - Literals are lower-cased once, here, never at match time
//! - Regex sources are kept as text; compilation belongs to the cache
//! - A `RuleSet` has no mutators; reloads build a new one

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::schema::{RoutingConfig, RuleConfig};

/// Opaque destination identifier (e.g. an application path).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The empty id, meaning "no handler chosen".
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `self`, or `other` when `self` is empty.
    pub fn or(self, other: &HandlerId) -> HandlerId {
        if self.is_empty() {
            other.clone()
        } else {
            self
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One routing rule: when any clause matches, route to `handler`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    literals: Vec<String>,
    regexes: Vec<String>,
    handler: HandlerId,
}

impl Rule {
    /// Create a rule. Literals are normalized to lower-case and
    /// de-duplicated; regex sources are kept verbatim and in order.
    pub fn new<L, R, S, T>(literals: L, regexes: R, handler: impl Into<HandlerId>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for literal in literals {
            let lower = literal.as_ref().to_lowercase();
            if !normalized.contains(&lower) {
                normalized.push(lower);
            }
        }

        Self {
            literals: normalized,
            regexes: regexes.into_iter().map(Into::into).collect(),
            handler: handler.into(),
        }
    }

    /// Lower-cased literal substrings.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Regex sources, in evaluation order.
    pub fn regexes(&self) -> &[String] {
        &self.regexes
    }

    pub fn handler(&self) -> &HandlerId {
        &self.handler
    }

    /// True when the rule has no clause at all and can never match.
    pub fn is_dead(&self) -> bool {
        self.literals.is_empty() && self.regexes.is_empty()
    }
}

impl From<&RuleConfig> for Rule {
    fn from(config: &RuleConfig) -> Self {
        Rule::new(
            &config.literals,
            config.regex_patterns.iter().cloned(),
            config.handler_target.as_str(),
        )
    }
}

/// Ordered, immutable rule list with a fallback handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: HandlerId,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, fallback: impl Into<HandlerId>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Build a rule set from persisted configuration.
    ///
    /// Nothing is rejected here: invalid regex sources are carried along and
    /// simply never match, and rule order is kept exactly as authored.
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            rules: config.rules.iter().map(Rule::from).collect(),
            fallback: HandlerId::new(config.default_handler_target.as_str()),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Handler used when no rule matches; may be empty.
    pub fn fallback(&self) -> &HandlerId {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
