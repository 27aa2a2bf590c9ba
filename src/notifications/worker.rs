//! Supervised notification worker.
//!
//! One consumer loop drains the [`JobReceiver`]. It runs inside a spawned
//! task watched by a supervisor: a panic while processing a job is logged
//! and counted, and the loop is respawned on the same receiver after a backoff.
//! The job that panicked is dropped. Once the restart budget is spent the
//! worker stays [`WorkerState::Stopped`] and producers see a closed queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::job::NotificationJob;
use super::queue::JobReceiver;
use crate::config::WorkerConfig;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Blocked waiting for a job.
    Idle,
    /// Handling a dequeued job.
    Processing,
    /// Queue closed and drained, or restart budget exhausted.
    Stopped,
}

/// Where simulated deliveries are recorded.
pub trait DeliverySink: Send + Sync + 'static {
    /// Record the delivery actions for one job.
    fn deliver(&self, job: &NotificationJob, actions: &[String]);
}

/// Sink that writes each delivery to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DeliverySink for LogSink {
    fn deliver(&self, job: &NotificationJob, actions: &[String]) {
        if actions.is_empty() {
            info!(job_id = %job.id, user_id = job.user_id, "processing notification job: no channels");
        } else {
            info!(job_id = %job.id, user_id = job.user_id, ?actions, "processing notification job");
        }
    }
}

/// Restart policy for the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorPolicy {
    /// Respawns allowed before the worker gives up.
    pub max_restarts: u32,
    /// Pause before each respawn.
    pub restart_backoff: Duration,
}

impl Default for SupervisorPolicy {
    fn default() -> Self {
        Self::from(&WorkerConfig::default())
    }
}

impl From<&WorkerConfig> for SupervisorPolicy {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            max_restarts: config.max_restarts,
            restart_backoff: config.restart_backoff(),
        }
    }
}

/// Point-in-time worker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Jobs handed to the sink.
    pub processed: u64,
    /// Times the loop panicked.
    pub panics: u32,
    /// Times the loop was respawned after a panic.
    pub restarts: u32,
}

#[derive(Debug, Default)]
struct Counters {
    processed: AtomicU64,
    panics: AtomicU32,
    restarts: AtomicU32,
}

/// Builder for the single notification worker.
pub struct NotificationWorker {
    sink: Arc<dyn DeliverySink>,
    policy: SupervisorPolicy,
}

impl NotificationWorker {
    /// Worker delivering to `sink` under the default restart policy.
    pub fn new(sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            sink,
            policy: SupervisorPolicy::default(),
        }
    }

    /// Override the restart policy.
    pub fn with_policy(mut self, policy: SupervisorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start draining `receiver` in a background tokio task.
    pub fn spawn(self, receiver: JobReceiver) -> WorkerHandle {
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        let counters = Arc::new(Counters::default());

        let task = tokio::spawn(supervise(
            Arc::new(Mutex::new(receiver)),
            self.sink,
            self.policy,
            Arc::new(state_tx),
            Arc::clone(&counters),
        ));

        WorkerHandle {
            monitor: WorkerMonitor {
                state: state_rx,
                counters,
            },
            task,
        }
    }
}

/// Read-only view of a running worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WorkerMonitor {
    state: watch::Receiver<WorkerState>,
    counters: Arc<Counters>,
}

impl WorkerMonitor {
    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            processed: self.counters.processed.load(Ordering::Acquire),
            panics: self.counters.panics.load(Ordering::Acquire),
            restarts: self.counters.restarts.load(Ordering::Acquire),
        }
    }
}

/// Owner handle for the worker task, held by the application lifecycle.
pub struct WorkerHandle {
    monitor: WorkerMonitor,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// A detached view for health reporting.
    pub fn monitor(&self) -> WorkerMonitor {
        self.monitor.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.monitor.state()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> WorkerStats {
        self.monitor.stats()
    }

    /// Wait for the worker to stop.
    ///
    /// Returns after every producer handle is dropped and the queue is
    /// drained, or after the restart budget runs out.
    pub async fn join(self) -> WorkerStats {
        if let Err(e) = self.task.await {
            warn!("notification worker supervisor ended abnormally: {e}");
        }
        self.monitor.stats()
    }
}

async fn supervise(
    receiver: Arc<Mutex<JobReceiver>>,
    sink: Arc<dyn DeliverySink>,
    policy: SupervisorPolicy,
    state: Arc<watch::Sender<WorkerState>>,
    counters: Arc<Counters>,
) {
    info!("notification worker started");
    loop {
        let run = tokio::spawn(drain(
            Arc::clone(&receiver),
            Arc::clone(&sink),
            Arc::clone(&state),
            Arc::clone(&counters),
        ));

        match run.await {
            Ok(()) => {
                info!("notification queue closed, worker stopping");
                break;
            }
            Err(e) if e.is_panic() => {
                let panics = counters.panics.fetch_add(1, Ordering::AcqRel) + 1;
                let restarts = counters.restarts.load(Ordering::Acquire);
                if restarts >= policy.max_restarts {
                    error!(
                        panics,
                        max_restarts = policy.max_restarts,
                        "notification worker panicked and exhausted its restart budget; \
                         queued notifications will not be processed"
                    );
                    break;
                }
                error!(panics, restarts, "notification worker panicked, restarting");
                tokio::time::sleep(policy.restart_backoff).await;
                counters.restarts.fetch_add(1, Ordering::AcqRel);
            }
            Err(e) => {
                warn!("notification worker cancelled: {e}");
                break;
            }
        }
    }
    // Producers must already see a closed queue once Stopped is published.
    drop(receiver);
    state.send_replace(WorkerState::Stopped);
}

async fn drain(
    receiver: Arc<Mutex<JobReceiver>>,
    sink: Arc<dyn DeliverySink>,
    state: Arc<watch::Sender<WorkerState>>,
    counters: Arc<Counters>,
) {
    let mut receiver = receiver.lock().await;
    loop {
        state.send_replace(WorkerState::Idle);
        let Some(job) = receiver.dequeue().await else {
            return;
        };
        state.send_replace(WorkerState::Processing);

        let actions = job.actions();
        debug!(job_id = %job.id, user_id = job.user_id, "dequeued notification job");
        sink.deliver(&job, &actions);
        counters.processed.fetch_add(1, Ordering::AcqRel);
    }
}
