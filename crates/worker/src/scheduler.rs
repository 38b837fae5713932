//! Polling scheduler for image tasks.
//!
//! A single background loop wakes on a fixed interval, asks the task store
//! for ready tasks and hands them to a [`TaskProcessor`] one after another.
//! Ticks never overlap: a tick that outlasts the interval just delays the
//! next one.
//!
//! Stopping is cooperative. The cancellation token is only observed between
//! ticks, so [`Scheduler::stop`] waits for the task in flight to finish.
//! Until the old loop has exited the scheduler is `Stopping` and refuses to
//! start a second loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use resizer_core::clock::Clock;
use resizer_db::repositories::ImageTaskRepo;
use resizer_db::DbPool;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::processor::{ImageWorker, TaskProcessor};

/// Smallest accepted polling interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Ready tasks returned by the store.
    pub found: usize,
    pub completed: usize,
    pub failed: usize,
}

enum SchedulerState {
    Stopped,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    /// Cancelled; the loop may still be finishing its last tick.
    Stopping,
}

fn lock(state: &Mutex<SchedulerState>) -> MutexGuard<'_, SchedulerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `Stopping -> Stopped`. Any other state is left alone.
fn finish_stopping(state: &Mutex<SchedulerState>) {
    let mut state = lock(state);
    if matches!(*state, SchedulerState::Stopping) {
        *state = SchedulerState::Stopped;
    }
}

/// Everything one tick needs, shared with the background loop.
struct TickRunner {
    pool: DbPool,
    processor: Arc<dyn TaskProcessor>,
    clock: Arc<dyn Clock>,
}

impl TickRunner {
    async fn tick(&self) -> Result<TickReport, sqlx::Error> {
        let now = self.clock.now();
        tracing::debug!(%now, "Checking for ready tasks");

        let tasks = ImageTaskRepo::ready_tasks(&self.pool, now).await?;
        let mut report = TickReport {
            found: tasks.len(),
            ..TickReport::default()
        };

        for task in &tasks {
            tracing::info!(
                task_id = task.id,
                scheduled_for = %task.scheduled_for,
                %now,
                "Dispatching ready task"
            );
            match self.processor.process(task).await {
                Ok(_) => report.completed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(task_id = task.id, error = %e, "Error processing image task");
                }
            }
        }

        Ok(report)
    }

    /// One tick as run by the loop: errors are logged, never propagated.
    async fn run_tick(&self) {
        match self.tick().await {
            Ok(report) if report.found > 0 => {
                tracing::info!(
                    found = report.found,
                    completed = report.completed,
                    failed = report.failed,
                    "Scheduler tick finished"
                );
            }
            Ok(_) => tracing::debug!("No ready tasks"),
            Err(e) => tracing::error!(error = %e, "Failed to fetch ready tasks"),
        }
    }
}

/// Start/stop handle around the polling loop.
pub struct Scheduler {
    runner: Arc<TickRunner>,
    interval: Duration,
    state: Arc<Mutex<SchedulerState>>,
}

impl Scheduler {
    pub fn new(
        pool: DbPool,
        processor: Arc<dyn TaskProcessor>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            runner: Arc::new(TickRunner {
                pool,
                processor,
                clock,
            }),
            interval: interval.max(MIN_INTERVAL),
            state: Arc::new(Mutex::new(SchedulerState::Stopped)),
        }
    }

    /// Scheduler backed by an [`ImageWorker`] on the same pool, with the
    /// interval and zone from `config`.
    pub fn from_config(pool: DbPool, config: &SchedulerConfig) -> Self {
        let worker = Arc::new(ImageWorker::new(pool.clone()));
        Self::new(pool, worker, Arc::new(config.clock()), config.interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock_state(), SchedulerState::Running { .. })
    }

    /// Spawn the polling loop. Returns `false` if a loop is running or
    /// still stopping.
    ///
    /// Must be called from within a Tokio runtime. The first tick fires one
    /// interval after start.
    pub fn start(&self) -> bool {
        let mut state = self.lock_state();
        match *state {
            SchedulerState::Stopped => {}
            SchedulerState::Running { .. } => return false,
            SchedulerState::Stopping => {
                tracing::warn!("Scheduler is still stopping; start ignored");
                return false;
            }
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.runner),
            Arc::clone(&self.state),
            self.interval,
            cancel.clone(),
        ));
        *state = SchedulerState::Running { cancel, handle };

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Scheduler started");
        true
    }

    /// Signal the loop to exit and wait until it has. Returns `false` if it
    /// was not running.
    ///
    /// A tick in progress is allowed to finish first, including the task
    /// currently being processed. The loop itself marks the scheduler
    /// stopped on exit, so dropping this future early does not leave it
    /// stuck in `Stopping`.
    pub async fn stop(&self) -> bool {
        let (cancel, handle) = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, SchedulerState::Stopping) {
                SchedulerState::Running { cancel, handle } => (cancel, handle),
                other => {
                    *state = other;
                    return false;
                }
            }
        };

        cancel.cancel();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Scheduler loop ended abnormally");
        }
        finish_stopping(&self.state);
        tracing::info!("Scheduler stopped");
        true
    }

    /// Run a single tick immediately on the caller's task.
    pub async fn tick(&self) -> Result<TickReport, sqlx::Error> {
        self.runner.tick().await
    }

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        lock(&self.state)
    }
}

async fn run_loop(
    runner: Arc<TickRunner>,
    state: Arc<Mutex<SchedulerState>>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_ms = period.as_millis() as u64, "Scheduler loop running");

    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Scheduler loop stopping");
                break;
            }
            _ = ticker.tick() => {
                runner.run_tick().await;
            }
        }
    }

    finish_stopping(&state);
}
