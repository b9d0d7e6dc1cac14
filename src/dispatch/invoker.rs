//! Handler invocation boundary.
//!
//! Launching the chosen application is the embedding environment's job;
//! the dispatcher only calls through this trait.

use std::io::Write;
use std::sync::Mutex;

use crate::routing::HandlerId;

/// Hands a URL to a resolved handler.
pub trait HandlerInvoker: Send + Sync {
    fn invoke(&self, handler: &HandlerId, url: &str);
}

/// Writes `handler<TAB>url` lines to stdout for a downstream launcher.
#[derive(Debug, Default)]
pub struct StdoutInvoker;

impl HandlerInvoker for StdoutInvoker {
    fn invoke(&self, handler: &HandlerId, url: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{handler}\t{url}").and_then(|_| out.flush()) {
            tracing::error!(handler = %handler, url = %url, error = %e, "Failed to write dispatch line");
        }
    }
}

/// Keeps every invocation in memory.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingInvoker {
    /// `(handler, url)` pairs in invocation order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HandlerInvoker for RecordingInvoker {
    fn invoke(&self, handler: &HandlerId, url: &str) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((handler.to_string(), url.to_string()));
    }
}
