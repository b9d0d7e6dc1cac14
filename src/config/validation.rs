//! Configuration validation.
//!
//! # Responsibilities
//! - Point out rules that cannot behave as the author probably intended
//! - Report every issue, not just the first
//!
//! # Design Decisions
//! - Diagnostics only: nothing here rejects a configuration. A bad rule
//!   must not take the whole rule file down with it.
//! - Pure function: RoutingConfig → Vec<ValidationIssue>

use std::fmt;

use regex::Regex;

use crate::config::schema::RoutingConfig;

/// A problem found in one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Zero-based rule position.
    pub rule: usize,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// No literals and no regexes: the rule never matches.
    DeadRule,
    /// A matching rule would hand over an empty handler.
    EmptyHandler,
    /// An empty literal matches every URL.
    EmptyLiteral,
    /// The regex source does not compile and will never match.
    InvalidRegex { pattern: String, error: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{}: ", self.rule + 1)?;
        match &self.kind {
            IssueKind::DeadRule => write!(f, "has no literals or regex patterns and never matches"),
            IssueKind::EmptyHandler => write!(f, "has an empty handler target"),
            IssueKind::EmptyLiteral => write!(f, "has an empty literal that matches every URL"),
            IssueKind::InvalidRegex { pattern, error } => {
                write!(f, "regex {pattern:?} does not compile and never matches: {error}")
            }
        }
    }
}

/// Collect every issue in `config`.
pub fn validate_config(config: &RoutingConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (rule, record) in config.rules.iter().enumerate() {
        let mut push = |kind| issues.push(ValidationIssue { rule, kind });

        if record.literals.is_empty() && record.regex_patterns.is_empty() {
            push(IssueKind::DeadRule);
        }
        if record.handler_target.is_empty() {
            push(IssueKind::EmptyHandler);
        }
        if record.literals.iter().any(String::is_empty) {
            push(IssueKind::EmptyLiteral);
        }
        for pattern in &record.regex_patterns {
            if let Err(e) = Regex::new(pattern) {
                push(IssueKind::InvalidRegex {
                    pattern: pattern.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RuleConfig;

    #[test]
    fn test_clean_config_has_no_issues() {
        let config = RoutingConfig {
            default_handler_target: "S".into(),
            rules: vec![RuleConfig::new(&["github.com"], &[r"\.dev\.local$"], "A")],
        };
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_reports_all_issues() {
        let config = RoutingConfig {
            default_handler_target: String::new(),
            rules: vec![
                RuleConfig::new(&[], &[], "A"),
                RuleConfig::new(&[""], &["[invalid", "ok"], ""),
            ],
        };

        let issues = validate_config(&config);
        let kinds: Vec<(usize, &IssueKind)> = issues.iter().map(|i| (i.rule, &i.kind)).collect();

        assert_eq!(issues.len(), 4);
        assert_eq!(kinds[0], (0, &IssueKind::DeadRule));
        assert_eq!(kinds[1], (1, &IssueKind::EmptyHandler));
        assert_eq!(kinds[2], (1, &IssueKind::EmptyLiteral));
        assert!(matches!(
            kinds[3],
            (1, IssueKind::InvalidRegex { pattern, .. }) if pattern == "[invalid"
        ));
    }

    #[test]
    fn test_display_is_one_based() {
        let issue = ValidationIssue {
            rule: 0,
            kind: IssueKind::DeadRule,
        };
        assert!(issue.to_string().starts_with("rule #1:"));
    }
}
