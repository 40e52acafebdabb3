//! Ingestion scheduler for NewsPulse.
//!
//! Runs an ingestion cycle over every category immediately on start and
//! then on a fixed interval. Cycles never overlap: a trigger that fires
//! while a cycle is still running is skipped.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{info, warn};

use super::ingest::{IngestReport, IngestionWorker};
use super::Category;
use crate::config::NewsConfig;

/// Timing parameters of the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    /// Time between cycle triggers.
    pub interval: Duration,
    /// Pause between two category fetches within a cycle.
    pub category_delay: Duration,
}

impl SchedulerSettings {
    /// Build settings from the news configuration.
    pub fn from_config(config: &NewsConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.refresh_interval_secs),
            category_delay: Duration::from_secs(config.category_delay_secs),
        }
    }
}

/// Per-category results of one cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Categories ingested successfully.
    pub ingested: Vec<IngestReport>,
    /// Categories skipped for this cycle, with the reason.
    pub failed: Vec<(Category, String)>,
}

impl CycleReport {
    /// Articles stored across all categories.
    pub fn total_inserted(&self) -> usize {
        self.ingested.iter().map(|r| r.inserted).sum()
    }
}

/// What happened to a cycle trigger.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle ran over every category.
    Completed(CycleReport),
    /// Another cycle was still running.
    Skipped,
}

struct CycleRunner {
    worker: IngestionWorker,
    category_delay: Duration,
    guard: Mutex<()>,
}

impl CycleRunner {
    async fn run(&self) -> CycleOutcome {
        let Ok(_running) = self.guard.try_lock() else {
            warn!("Previous ingestion cycle still running, skipping this trigger");
            return CycleOutcome::Skipped;
        };

        info!("Starting ingestion cycle ({} categories)", Category::ALL.len());
        let mut report = CycleReport::default();

        for (i, category) in Category::ALL.into_iter().enumerate() {
            if i > 0 && !self.category_delay.is_zero() {
                sleep(self.category_delay).await;
            }

            match self.worker.ingest_category(category).await {
                Ok(result) => report.ingested.push(result),
                Err(e) => {
                    warn!(category = %category, error = %e, "Skipping category for this cycle");
                    report.failed.push((category, e.to_string()));
                }
            }
        }

        info!(
            inserted = report.total_inserted(),
            failed = report.failed.len(),
            "Ingestion cycle finished"
        );
        CycleOutcome::Completed(report)
    }
}

/// Owns the ingestion timer.
pub struct IngestScheduler {
    runner: Arc<CycleRunner>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl IngestScheduler {
    /// Create a stopped scheduler.
    pub fn new(worker: IngestionWorker, settings: SchedulerSettings) -> Self {
        Self {
            runner: Arc::new(CycleRunner {
                worker,
                category_delay: settings.category_delay,
                guard: Mutex::new(()),
            }),
            interval: settings.interval,
            handle: None,
        }
    }

    /// Start the timer. The first cycle is triggered immediately.
    ///
    /// Must be called from within a tokio runtime. Calling it on a running
    /// scheduler does nothing.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Ingestion scheduler already running");
            return;
        }

        info!(
            "Ingestion scheduler started (interval: {} seconds)",
            self.interval.as_secs()
        );

        let runner = Arc::clone(&self.runner);
        let period = self.interval;
        self.handle = Some(tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;
                // Spawned so the timer keeps ticking while a cycle runs.
                let runner = Arc::clone(&runner);
                tokio::spawn(async move {
                    runner.run().await;
                });
            }
        }));
    }

    /// Stop the timer. A cycle already in flight runs to completion.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Ingestion scheduler stopped");
        }
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Run one cycle now, unless another is in progress.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.runner.run().await
    }
}

impl Drop for IngestScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
