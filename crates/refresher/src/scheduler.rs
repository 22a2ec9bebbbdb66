//! # Refresh Scheduler
//!
//! This module drives the contact refresh cycle:
//! 1. Fetch raw records from the source
//! 2. Parse them in parallel
//! 3. Drop duplicate records (same fingerprint)
//! 4. Apply the qualification filters
//! 5. Publish the qualified set in a single swap
//!
//! A single background task runs cycles back to back on a Tokio interval.
//! Cycles never overlap: an overrunning cycle delays the next one, which then
//! starts as soon as the previous one finishes. The published set lives in a
//! `watch` channel, so readers always get a complete set and never wait for
//! a cycle in progress.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use contacts::{CardParser, Contact};
use pipeline::FilterPipeline;
use sources::SourceCollector;

use crate::config::RefreshConfig;
use crate::diagnostics::Diagnostics;
use crate::error::SchedulerError;
use crate::status::{CycleOutcome, CycleReport, RefreshStatus, SchedulerState, StatusTracker};

/// An immutable published set of contacts.
pub type ContactSet = Arc<[Contact]>;

type ParsedBatch = (Vec<String>, Vec<contacts::Result<Contact>>);

enum Worker {
    NotStarted,
    Running {
        cancel: CancellationToken,
        handle: Option<JoinHandle<()>>,
    },
    Stopped {
        handle: Option<JoinHandle<()>>,
    },
}

/// Why a cycle ended without publishing.
enum CycleFailure {
    Source(String),
    Parser(String),
}

/// State shared between the scheduler handle and its background task.
struct Shared {
    collector: Arc<dyn SourceCollector>,
    parser: Arc<CardParser>,
    published: watch::Sender<ContactSet>,
    diagnostics: Diagnostics,
    status: StatusTracker,
    /// Serializes cycles, including ones requested through `run_cycle`
    cycle_lock: tokio::sync::Mutex<()>,
}

/// Periodically refreshes the published contact set from a source.
pub struct RefreshScheduler {
    shared: Arc<Shared>,
    worker: Mutex<Worker>,
}

impl RefreshScheduler {
    /// Create a scheduler; nothing runs until `start`.
    ///
    /// # Arguments
    /// * `collector` - Where raw records come from
    /// * `parser` - Shared parser, built once by the host
    pub fn new(collector: Arc<dyn SourceCollector>, parser: Arc<CardParser>) -> Self {
        Self::with_diagnostics(collector, parser, Diagnostics::default())
    }

    /// Like `new`, with a caller-supplied diagnostics sink.
    pub fn with_diagnostics(
        collector: Arc<dyn SourceCollector>,
        parser: Arc<CardParser>,
        diagnostics: Diagnostics,
    ) -> Self {
        let (published, _) = watch::channel(ContactSet::from(Vec::new()));
        Self {
            shared: Arc::new(Shared {
                collector,
                parser,
                published,
                diagnostics,
                status: StatusTracker::default(),
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
            worker: Mutex::new(Worker::NotStarted),
        }
    }

    /// Begin periodic refreshing. The first cycle runs immediately.
    ///
    /// Must be called from within a Tokio runtime. The configuration is
    /// checked before anything is scheduled.
    pub fn start(&self, config: RefreshConfig) -> Result<(), SchedulerError> {
        config.validate()?;

        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        match *worker {
            Worker::NotStarted => {}
            Worker::Running { .. } => return Err(SchedulerError::AlreadyStarted),
            Worker::Stopped { .. } => return Err(SchedulerError::Stopped),
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

        info!(
            source = self.shared.collector.name(),
            interval = ?config.refresh_interval,
            match_category = %config.match_category,
            "Starting contact refresh"
        );

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_worker(
            Arc::clone(&self.shared),
            config,
            cancel.clone(),
        ));
        *worker = Worker::Running {
            cancel,
            handle: Some(handle),
        };
        Ok(())
    }

    /// Run one cycle now and wait for it.
    ///
    /// Waits for any cycle already in progress first; cycles never run
    /// concurrently.
    pub async fn run_cycle(&self, match_category: &str) -> CycleReport {
        let pipeline = FilterPipeline::qualification(match_category);
        self.shared.cycle(&pipeline).await
    }

    /// The most recently published contacts. Never waits for a running cycle.
    pub fn current_contacts(&self) -> ContactSet {
        self.shared.published.borrow().clone()
    }

    /// Be notified every time a new set is published.
    pub fn subscribe(&self) -> watch::Receiver<ContactSet> {
        self.shared.published.subscribe()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.shared.diagnostics
    }

    pub fn status(&self) -> RefreshStatus {
        let state = match *self.worker.lock().unwrap_or_else(|e| e.into_inner()) {
            Worker::NotStarted => SchedulerState::NotStarted,
            Worker::Running { .. } => SchedulerState::Running,
            Worker::Stopped { .. } => SchedulerState::Stopped,
        };
        self.shared.status.snapshot(state)
    }

    /// Cancel future cycles. A cycle already running finishes and publishes.
    ///
    /// Stopping is terminal; calling it again is a no-op.
    pub fn stop(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *worker, Worker::Stopped { handle: None });
        *worker = match previous {
            Worker::Running { cancel, handle } => {
                cancel.cancel();
                info!(source = self.shared.collector.name(), "Contact refresh stopped");
                Worker::Stopped { handle }
            }
            Worker::NotStarted => Worker::Stopped { handle: None },
            stopped @ Worker::Stopped { .. } => stopped,
        };
    }

    /// Stop and wait for the background task (and any in-flight cycle) to end.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = {
            let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
            match &mut *worker {
                Worker::Stopped { handle } => handle.take(),
                _ => None,
            }
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Refresh worker ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        let worker = self.worker.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Worker::Running { cancel, .. } = worker {
            cancel.cancel();
        }
    }
}

/// Background loop: tick, run a cycle, repeat until cancelled.
async fn run_worker(shared: Arc<Shared>, config: RefreshConfig, cancel: CancellationToken) {
    let pipeline = FilterPipeline::qualification(&config.match_category);

    // First tick completes immediately
    let mut ticker = tokio::time::interval(config.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Not raced against cancellation: a started cycle always completes
        let report = shared.cycle(&pipeline).await;
        debug!(
            "Cycle finished: {:?}, {} published in {:.2?}",
            report.outcome, report.published, report.elapsed
        );
    }

    info!(source = shared.collector.name(), "Refresh worker exited");
}

impl Shared {
    async fn cycle(&self, pipeline: &FilterPipeline) -> CycleReport {
        let _serialized = self.cycle_lock.lock().await;
        let started = Instant::now();
        self.status.mark_started();

        let records = match self.fetch().await {
            Ok(records) => records,
            Err(message) => return self.keep_previous(started, CycleFailure::Source(message)),
        };
        let fetched = records.len();
        debug!("{} raw records read from {}", fetched, self.collector.name());

        let (records, results) = match self.parse(records).await {
            Ok(batch) => batch,
            Err(message) => return self.keep_previous(started, CycleFailure::Parser(message)),
        };

        let mut seen = HashSet::with_capacity(results.len());
        let mut parsed = Vec::with_capacity(results.len());
        let mut failed = 0;
        let mut duplicates = 0;

        for (raw, result) in records.iter().zip(results) {
            match result {
                Ok(contact) => {
                    if !seen.insert(contact.fingerprint().clone()) {
                        debug!("Skipping duplicate record {}", contact.fingerprint().short());
                        duplicates += 1;
                        continue;
                    }
                    debug!("Found contact: {}", contact.full_name());
                    parsed.push(contact);
                }
                Err(e) => {
                    let diagnostic = self.diagnostics.record(raw, &e);
                    warn!(
                        fingerprint = diagnostic.fingerprint.short(),
                        "Error decoding vCard: {}", e
                    );
                    failed += 1;
                }
            }
        }

        let loaded = parsed.len();
        debug!("Number of contacts loaded: {}, now filtering", loaded);
        let qualified = pipeline.apply(parsed);
        let published = qualified.len();

        self.published.send_replace(ContactSet::from(qualified));

        let report = CycleReport {
            outcome: CycleOutcome::Published,
            fetched,
            parsed: loaded,
            failed,
            duplicates,
            published,
            elapsed: started.elapsed(),
        };
        info!(
            "Contacts refreshed from {}: {} read, {} rejected, {} kept",
            self.collector.name(),
            fetched,
            failed,
            published
        );
        self.status.mark_finished(report.clone(), None);
        report
    }

    /// Source records, fetched on the blocking pool.
    async fn fetch(&self) -> Result<Vec<String>, String> {
        let collector = Arc::clone(&self.collector);
        match tokio::task::spawn_blocking(move || collector.fetch_raw_records()).await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("collector task failed: {e}")),
        }
    }

    /// Parse on the blocking pool; records come back alongside their results.
    async fn parse(&self, records: Vec<String>) -> Result<ParsedBatch, String> {
        let parser = Arc::clone(&self.parser);
        tokio::task::spawn_blocking(move || {
            let results = parser.parse_batch(&records);
            (records, results)
        })
        .await
        .map_err(|e| format!("parser task failed: {e}"))
    }

    fn keep_previous(&self, started: Instant, failure: CycleFailure) -> CycleReport {
        let (outcome, message) = match failure {
            CycleFailure::Source(message) => {
                warn!(
                    source = self.collector.name(),
                    "Card source failed, keeping previous contacts: {}", message
                );
                (CycleOutcome::SourceFailed, message)
            }
            CycleFailure::Parser(message) => {
                error!("Card parsing aborted, keeping previous contacts: {}", message);
                (CycleOutcome::ParserFailed, message)
            }
        };
        let report = CycleReport {
            outcome,
            fetched: 0,
            parsed: 0,
            failed: 0,
            duplicates: 0,
            published: self.published.borrow().len(),
            elapsed: started.elapsed(),
        };
        self.status.mark_finished(report.clone(), Some(message));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sources::{SourceError, StaticCollector};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    fn card(body: &str) -> String {
        format!("BEGIN:VCARD\nVERSION:3.0\n{body}\nEND:VCARD\n")
    }

    fn scheduler_for(records: Vec<String>) -> RefreshScheduler {
        RefreshScheduler::new(
            Arc::new(StaticCollector::new(records)),
            Arc::new(CardParser::new()),
        )
    }

    /// Fails on demand and counts fetches.
    struct FlakyCollector {
        records: Vec<String>,
        failing: AtomicBool,
        fetches: AtomicUsize,
    }

    impl SourceCollector for FlakyCollector {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch_raw_records(&self) -> sources::Result<Vec<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(SourceError::Walk("share unavailable".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    #[tokio::test]
    async fn test_run_cycle_publishes_qualified_contacts() {
        let scheduler = scheduler_for(vec![
            card("N:Doe;Jane;;;\nTEL:555-0100"),
            card("N:Fields;No;;;"),
        ]);
        assert!(scheduler.current_contacts().is_empty());

        let report = scheduler.run_cycle("").await;

        assert_eq!(report.outcome, CycleOutcome::Published);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.parsed, 2);
        assert_eq!(report.published, 1);
        assert_eq!(scheduler.current_contacts()[0].full_name(), "Jane Doe");
    }

    #[tokio::test]
    async fn test_duplicate_records_are_published_once() {
        let jane = card("N:Doe;Jane;;;\nTEL:555-0100");
        let scheduler = scheduler_for(vec![jane.clone(), jane]);

        let report = scheduler.run_cycle("").await;

        assert_eq!(report.duplicates, 1);
        assert_eq!(scheduler.current_contacts().len(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_keeps_previous_set() {
        let collector = Arc::new(FlakyCollector {
            records: vec![card("N:Doe;Jane;;;\nTEL:555-0100")],
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        });
        let scheduler = RefreshScheduler::new(collector.clone(), Arc::new(CardParser::new()));

        scheduler.run_cycle("").await;
        let before = scheduler.current_contacts();
        assert_eq!(before.len(), 1);

        collector.failing.store(true, Ordering::SeqCst);
        let report = scheduler.run_cycle("").await;

        assert_eq!(report.outcome, CycleOutcome::SourceFailed);
        assert_eq!(report.published, 1);
        assert!(Arc::ptr_eq(&before, &scheduler.current_contacts()));
        let status = scheduler.status();
        assert_eq!(status.cycles_completed, 2);
        assert!(status.last_error.unwrap().contains("share unavailable"));

        collector.failing.store(false, Ordering::SeqCst);
        scheduler.run_cycle("").await;
        assert!(scheduler.status().last_error.is_none());
    }

    #[tokio::test]
    async fn test_parser_failure_is_not_a_source_failure() {
        let scheduler = scheduler_for(vec![card("N:Doe;Jane;;;\nTEL:555-0100")]);
        scheduler.run_cycle("").await;
        let before = scheduler.current_contacts();

        let report = scheduler.shared.keep_previous(
            Instant::now(),
            CycleFailure::Parser("parser task failed: panicked".to_string()),
        );

        assert_eq!(report.outcome, CycleOutcome::ParserFailed);
        assert_eq!(report.published, 1);
        assert!(Arc::ptr_eq(&before, &scheduler.current_contacts()));
        let status = scheduler.status();
        assert_eq!(status.last_report.unwrap().outcome, CycleOutcome::ParserFailed);
        assert!(status.last_error.unwrap().starts_with("parser task failed"));
    }

    #[tokio::test]
    async fn test_empty_source_clears_published_set() {
        let collector = StaticCollector::new([card("N:Doe;Jane;;;\nTEL:555-0100")]);
        let scheduler =
            RefreshScheduler::new(Arc::new(collector.clone()), Arc::new(CardParser::new()));

        scheduler.run_cycle("").await;
        assert_eq!(scheduler.current_contacts().len(), 1);

        collector.replace(Vec::<String>::new());
        let report = scheduler.run_cycle("").await;

        assert_eq!(report.outcome, CycleOutcome::Published);
        assert!(scheduler.current_contacts().is_empty());
    }

    #[tokio::test]
    async fn test_start_validates_before_scheduling() {
        let collector = Arc::new(FlakyCollector {
            records: vec![],
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        });
        let scheduler = RefreshScheduler::new(collector.clone(), Arc::new(CardParser::new()));

        let err = scheduler
            .start(RefreshConfig::from_hours(0, ""))
            .unwrap_err();
        assert_eq!(err, SchedulerError::Config(crate::ConfigError::ZeroInterval));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(collector.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.status().state, SchedulerState::NotStarted);
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let scheduler = scheduler_for(vec![]);
        assert_eq!(scheduler.status().state, SchedulerState::NotStarted);

        scheduler.start(RefreshConfig::from_hours(1, "")).unwrap();
        assert_eq!(scheduler.status().state, SchedulerState::Running);
        assert_eq!(
            scheduler.start(RefreshConfig::from_hours(1, "")),
            Err(SchedulerError::AlreadyStarted)
        );

        scheduler.shutdown().await;
        assert_eq!(scheduler.status().state, SchedulerState::Stopped);
        assert_eq!(
            scheduler.start(RefreshConfig::from_hours(1, "")),
            Err(SchedulerError::Stopped)
        );

        // Repeated stops are harmless
        scheduler.stop();
        scheduler.shutdown().await;
    }

    #[test]
    fn test_start_outside_runtime() {
        let scheduler = scheduler_for(vec![]);
        assert_eq!(
            scheduler.start(RefreshConfig::from_hours(1, "")),
            Err(SchedulerError::NoRuntime)
        );
    }

    #[tokio::test]
    async fn test_category_is_applied_by_worker() {
        let scheduler = scheduler_for(vec![
            card("N:Doe;Jane;;;\nTEL:555-0100\nCATEGORIES:Family"),
            card("N:Roe;Rich;;;\nTEL:555-0101\nCATEGORIES:Work"),
        ]);
        let mut updates = scheduler.subscribe();

        scheduler.start(RefreshConfig::from_hours(1, "Work")).unwrap();
        tokio::time::timeout(Duration::from_secs(5), updates.changed())
            .await
            .expect("first cycle should publish")
            .unwrap();

        let published = scheduler.current_contacts();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].full_name(), "Rich Roe");

        scheduler.shutdown().await;
    }
}
