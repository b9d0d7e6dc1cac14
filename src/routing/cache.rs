//! Compiled regex cache.
//!
//! # Responsibilities
//! - Compile each regex source at most once per process
//! - Remember failed compilations so they are never retried
//! - Serve concurrent lookups without serializing on compilation
//!
//! # Design Decisions
//! - Append-only: no eviction, sources are a small closed set
//! - Shared across rule set generations (compilation is pure)
//! - Each source gets its own `OnceLock` slot. The map shard lock is held
//!   only to find or insert the slot, so compiling one pattern never blocks
//!   hits on another, and racing misses on the same pattern compile once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use regex::Regex;

use crate::observability::metrics;

/// Outcome of compiling one regex source.
#[derive(Debug)]
pub enum CompiledPattern {
    Ready(Regex),
    Failed(String),
}

impl CompiledPattern {
    fn compile(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => CompiledPattern::Ready(regex),
            Err(e) => CompiledPattern::Failed(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CompiledPattern::Ready(_))
    }

    /// A failed pattern matches nothing.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            CompiledPattern::Ready(regex) => regex.is_match(text),
            CompiledPattern::Failed(_) => false,
        }
    }

    pub fn regex(&self) -> Option<&Regex> {
        match self {
            CompiledPattern::Ready(regex) => Some(regex),
            CompiledPattern::Failed(_) => None,
        }
    }

    /// Compiler message for a failed pattern.
    pub fn error(&self) -> Option<&str> {
        match self {
            CompiledPattern::Ready(_) => None,
            CompiledPattern::Failed(message) => Some(message),
        }
    }
}

type Slot = Arc<OnceLock<Arc<CompiledPattern>>>;

/// Memoization table from regex source text to compiled outcome.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: DashMap<String, Slot>,
    compilations: AtomicUsize,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the compiled form of `source`, compiling it on first use.
    ///
    /// Failures are cached too: a bad source is compiled once and every
    /// later lookup returns the same `Failed` entry.
    pub fn get_or_compile(&self, source: &str) -> Arc<CompiledPattern> {
        let slot = self.slot(source);
        let compiled = slot.get_or_init(|| Arc::new(self.compile(source)));
        Arc::clone(compiled)
    }

    fn slot(&self, source: &str) -> Slot {
        if let Some(slot) = self.entries.get(source) {
            return Arc::clone(slot.value());
        }
        // Second check happens under the shard write lock inside `entry`.
        let slot = self.entries.entry(source.to_owned()).or_default();
        Arc::clone(slot.value())
    }

    fn compile(&self, source: &str) -> CompiledPattern {
        self.compilations.fetch_add(1, Ordering::Relaxed);
        let compiled = CompiledPattern::compile(source);
        metrics::record_pattern_compilation(compiled.is_ok());

        if let Some(error) = compiled.error() {
            tracing::warn!(
                pattern = %source,
                error = %error,
                "Regex pattern failed to compile; it will never match"
            );
        } else {
            tracing::debug!(pattern = %source, "Compiled regex pattern");
        }
        compiled
    }

    /// Number of distinct sources seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total compilations performed since creation.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}
