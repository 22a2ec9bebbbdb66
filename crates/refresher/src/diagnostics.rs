//! Parse failure diagnostics.
//!
//! Every record the parser rejects during a cycle is recorded here: kept in a
//! bounded history for polling, and broadcast to live subscribers.

use chrono::{DateTime, Utc};
use contacts::{Fingerprint, ParseError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Default number of diagnostics kept in memory
pub const DEFAULT_HISTORY: usize = 256;

const EXCERPT_CHARS: usize = 80;

/// One rejected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub at: DateTime<Utc>,
    /// Identity of the raw record that failed
    pub fingerprint: Fingerprint,
    /// Start of the record, whitespace collapsed
    pub excerpt: String,
    pub reason: String,
}

/// Bounded history plus a broadcast stream of parse failures.
pub struct Diagnostics {
    history: Mutex<VecDeque<ParseDiagnostic>>,
    capacity: usize,
    tx: broadcast::Sender<ParseDiagnostic>,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            tx,
        }
    }

    /// Record a failure for `raw`; the oldest entry is dropped when full.
    pub fn record(&self, raw: &str, error: &ParseError) -> ParseDiagnostic {
        let diagnostic = ParseDiagnostic {
            at: Utc::now(),
            fingerprint: Fingerprint::of(raw),
            excerpt: excerpt(raw),
            reason: error.to_string(),
        };

        {
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            if history.len() == self.capacity {
                history.pop_front();
            }
            history.push_back(diagnostic.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(diagnostic.clone());
        diagnostic
    }

    /// Recorded diagnostics, oldest first.
    pub fn recent(&self) -> Vec<ParseDiagnostic> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Receive diagnostics recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ParseDiagnostic> {
        self.tx.subscribe()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

fn excerpt(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
