//! Runtime snapshot of the refresher, for hosts that want to report health.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Lifecycle of a scheduler. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    NotStarted,
    Running,
    Stopped,
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new set was published (possibly empty)
    Published,
    /// The source failed; the previous set was kept
    SourceFailed,
    /// The parsing task itself failed (not a bad record); the previous set
    /// was kept
    ParserFailed,
}

/// Counts from one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Raw records returned by the source
    pub fetched: usize,
    /// Records that parsed into a contact (after dropping duplicates)
    pub parsed: usize,
    /// Records rejected by the parser
    pub failed: usize,
    /// Records whose fingerprint was already seen this cycle
    pub duplicates: usize,
    /// Size of the published set after the cycle
    pub published: usize,
    pub elapsed: Duration,
}

/// Point-in-time view of a scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatus {
    pub state: SchedulerState,
    pub cycle_in_progress: bool,
    pub cycles_completed: u64,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    /// Most recent source or parser failure, cleared by the next published
    /// cycle
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Counters {
    cycle_in_progress: bool,
    cycles_completed: u64,
    last_started_at: Option<DateTime<Utc>>,
    last_finished_at: Option<DateTime<Utc>>,
    last_report: Option<CycleReport>,
    last_error: Option<String>,
}

/// Shared, lock-protected cycle bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct StatusTracker {
    counters: Mutex<Counters>,
}

impl StatusTracker {
    pub(crate) fn mark_started(&self) {
        let mut c = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        c.cycle_in_progress = true;
        c.last_started_at = Some(Utc::now());
    }

    pub(crate) fn mark_finished(&self, report: CycleReport, error: Option<String>) {
        let mut c = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        c.cycle_in_progress = false;
        c.cycles_completed += 1;
        c.last_finished_at = Some(Utc::now());
        c.last_report = Some(report);
        c.last_error = error;
    }

    pub(crate) fn snapshot(&self, state: SchedulerState) -> RefreshStatus {
        let c = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        RefreshStatus {
            state,
            cycle_in_progress: c.cycle_in_progress,
            cycles_completed: c.cycles_completed,
            last_started_at: c.last_started_at,
            last_finished_at: c.last_finished_at,
            last_report: c.last_report.clone(),
            last_error: c.last_error.clone(),
        }
    }
}
