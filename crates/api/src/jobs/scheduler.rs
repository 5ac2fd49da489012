//! Periodic background jobs with cooperative shutdown.
//!
//! Each registered job runs on its own task. A failed run is logged and
//! counted; the job keeps its schedule. Shutdown is signalled through a
//! watch channel, and a run in progress finishes before its task exits.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::middleware::metrics::record_job_run;

/// Consecutive failures after which every further failure is logged at
/// error level with the streak length.
const FAILURE_STREAK_ALERT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFrequency {
    Seconds(u64),
    Minutes(u64),
}

impl JobFrequency {
    pub fn duration(&self) -> Duration {
        match self {
            JobFrequency::Seconds(secs) => Duration::from_secs(*secs),
            JobFrequency::Minutes(mins) => Duration::from_secs(*mins * 60),
        }
    }
}

#[async_trait::async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    fn frequency(&self) -> JobFrequency;

    /// Run once as soon as the scheduler starts instead of waiting one period.
    fn run_on_start(&self) -> bool {
        false
    }

    async fn execute(&self) -> Result<(), String>;
}

pub struct JobScheduler {
    jobs: Vec<Arc<dyn Job>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    pub fn register<J: Job + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Spawns one task per registered job.
    pub fn start(&mut self) {
        info!(jobs = self.jobs.len(), "Starting job scheduler");

        for job in &self.jobs {
            let job = Arc::clone(job);
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.handles.push(tokio::spawn(run_job(job, shutdown_rx)));
        }
    }

    /// Signals every job to stop after its current run.
    pub fn shutdown(&self) {
        info!("Initiating job scheduler shutdown");
        self.shutdown_tx.send_replace(true);
    }

    /// Waits for job tasks to exit, giving up after `timeout`.
    pub async fn wait_for_shutdown(self, timeout: Duration) {
        let pending = self.handles.len();
        let join_all = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Job task panicked");
                }
            }
        };

        match tokio::time::timeout(timeout, join_all).await {
            Ok(()) => info!(jobs = pending, "All jobs stopped"),
            Err(_) => warn!(timeout_secs = timeout.as_secs(), "Job shutdown timed out"),
        }
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(job: Arc<dyn Job>, mut shutdown_rx: watch::Receiver<bool>) {
    let name = job.name();
    let frequency = job.frequency();
    let mut interval = tokio::time::interval(frequency.duration());
    // A slow run delays the next one rather than triggering a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if !job.run_on_start() {
        interval.tick().await;
    }
    info!(job = name, frequency = ?frequency, "Job scheduled");

    let mut failure_streak: u32 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let started = Instant::now();
                let result = job.execute().await;
                let elapsed = started.elapsed();

                match result {
                    Ok(()) => {
                        if failure_streak > 0 {
                            info!(job = name, failures = failure_streak, "Job recovered");
                        }
                        failure_streak = 0;
                        record_job_run(name, "ok", elapsed.as_secs_f64());
                        debug!(job = name, elapsed_ms = elapsed.as_millis(), "Job completed");
                    }
                    Err(e) => {
                        failure_streak = failure_streak.saturating_add(1);
                        record_job_run(name, "error", elapsed.as_secs_f64());
                        if failure_streak >= FAILURE_STREAK_ALERT {
                            error!(
                                job = name,
                                failures = failure_streak,
                                error = %e,
                                "Job keeps failing"
                            );
                        } else {
                            warn!(
                                job = name,
                                elapsed_ms = elapsed.as_millis(),
                                error = %e,
                                "Job failed"
                            );
                        }
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                // A dropped sender also means shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!(job = name, "Job stopped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        runs: Arc<AtomicUsize>,
        fail: bool,
        eager: bool,
    }

    impl CountingJob {
        fn new(runs: &Arc<AtomicUsize>) -> Self {
            Self {
                runs: Arc::clone(runs),
                fail: false,
                eager: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn frequency(&self) -> JobFrequency {
            JobFrequency::Seconds(1)
        }

        fn run_on_start(&self) -> bool {
            self.eager
        }

        async fn execute(&self) -> Result<(), String> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("boom".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_frequency_duration() {
        assert_eq!(JobFrequency::Seconds(30).duration(), Duration::from_secs(30));
        assert_eq!(JobFrequency::Minutes(2).duration(), Duration::from_secs(120));
    }

    #[test]
    fn test_register() {
        let mut scheduler = JobScheduler::default();
        scheduler.register(CountingJob::new(&Arc::new(AtomicUsize::new(0))));
        assert_eq!(scheduler.jobs.len(), 1);
        assert!(scheduler.handles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_waits_one_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob::new(&runs));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_on_start() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob {
            eager: true,
            ..CountingJob::new(&runs)
        });
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_job_keeps_running() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob {
            fail: true,
            ..CountingJob::new(&runs)
        });
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(3500)).await;

        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;

        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_jobs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = JobScheduler::new();
        scheduler.register(CountingJob::new(&runs));
        scheduler.start();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        scheduler.shutdown();
        scheduler.wait_for_shutdown(Duration::from_secs(2)).await;
        let after_shutdown = runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_shutdown);
    }
}
