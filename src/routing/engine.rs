//! Routing engine: resolve a URL to a handler.
//!
//! # Responsibilities
//! - Hold the installed `RuleSet` behind an atomically swappable pointer
//! - Match URLs against it, first rule wins
//! - Fall back to the rule set's fallback handler
//!
//! # Design Decisions
//! - `resolve` loads the rule set once and uses that snapshot for the whole
//!   call, so a concurrent swap is never observed half-way
//! - Within a rule, literals are tried before regexes
//! - Literal matching is case-insensitive, regex matching runs on the raw URL
//! - Never fails: bad patterns and odd input just don't match

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::routing::cache::PatternCache;
use crate::routing::rule::{HandlerId, Rule, RuleSet};

/// Which clause of a rule produced the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Literal(String),
    Regex(String),
}

/// Detailed outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rule at `index` matched through `clause`.
    Rule {
        index: usize,
        clause: Clause,
        handler: HandlerId,
    },
    /// No rule matched; the rule set's fallback (possibly empty) applies.
    Fallback(HandlerId),
}

impl Resolution {
    pub fn handler(&self) -> &HandlerId {
        match self {
            Resolution::Rule { handler, .. } => handler,
            Resolution::Fallback(handler) => handler,
        }
    }

    pub fn into_handler(self) -> HandlerId {
        match self {
            Resolution::Rule { handler, .. } => handler,
            Resolution::Fallback(handler) => handler,
        }
    }
}

/// Resolves URLs against the currently installed rule set.
#[derive(Debug)]
pub struct RoutingEngine {
    current: ArcSwap<RuleSet>,
    cache: PatternCache,
}

impl RoutingEngine {
    pub fn new(rule_set: RuleSet) -> Self {
        metrics::record_rule_count(rule_set.len());
        Self {
            current: ArcSwap::from_pointee(rule_set),
            cache: PatternCache::new(),
        }
    }

    /// Install `rule_set`, replacing the previous one in a single swap.
    ///
    /// Lookups started after this returns see `rule_set` (or a later one).
    pub fn set_rule_set(&self, rule_set: RuleSet) {
        let rules = rule_set.len();
        self.current.store(Arc::new(rule_set));
        metrics::record_rule_count(rules);
        tracing::debug!(rules, "Rule set installed");
    }

    /// The currently installed rule set.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.current.load_full()
    }

    /// Shared compiled pattern cache.
    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Handler for `url`: first matching rule, else the fallback, else empty.
    pub fn resolve(&self, url: &str) -> HandlerId {
        self.resolve_detailed(url).into_handler()
    }

    /// Like [`resolve`](Self::resolve) but reports which rule and clause matched.
    pub fn resolve_detailed(&self, url: &str) -> Resolution {
        let rule_set = self.current.load();
        self.resolve_in(&rule_set, url)
    }

    /// Resolve against an explicit rule set (e.g. a held snapshot), sharing
    /// this engine's cache.
    pub fn resolve_in(&self, rule_set: &RuleSet, url: &str) -> Resolution {
        let resolution = self.match_rules(rule_set, url);

        let outcome = match &resolution {
            Resolution::Rule { .. } => "rule",
            Resolution::Fallback(h) if h.is_empty() => "none",
            Resolution::Fallback(_) => "fallback",
        };
        metrics::record_resolution(outcome);
        tracing::trace!(url = %url, handler = %resolution.handler(), outcome, "Resolved URL");

        resolution
    }

    fn match_rules(&self, rule_set: &RuleSet, url: &str) -> Resolution {
        let lowered = url.to_lowercase();

        for (index, rule) in rule_set.rules().iter().enumerate() {
            if let Some(clause) = self.match_rule(rule, url, &lowered) {
                return Resolution::Rule {
                    index,
                    clause,
                    handler: rule.handler().clone(),
                };
            }
        }

        Resolution::Fallback(rule_set.fallback().clone())
    }

    fn match_rule(&self, rule: &Rule, url: &str, lowered: &str) -> Option<Clause> {
        if let Some(literal) = rule.literals().iter().find(|l| lowered.contains(l.as_str())) {
            return Some(Clause::Literal(literal.clone()));
        }

        rule.regexes()
            .iter()
            .find(|source| self.cache.get_or_compile(source).is_match(url))
            .map(|source| Clause::Regex(source.clone()))
    }
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}
