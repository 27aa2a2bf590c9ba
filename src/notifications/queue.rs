//! Bounded FIFO task queue between request handlers and the worker.
//!
//! Many producers hold cloned [`TaskQueue`] handles; exactly one
//! [`JobReceiver`] exists. Jobs come out in the order their `enqueue`
//! calls completed.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::job::NotificationJob;
use crate::error::{NotifyError, Result};

/// What a producer does when the queue is at capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Fail immediately with [`NotifyError::QueueFull`]. Producers never block.
    #[default]
    Reject,
    /// Suspend the producer until the worker frees a slot.
    Wait,
}

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<NotificationJob>,
    policy: OverflowPolicy,
}

/// The single consumer end of a [`TaskQueue`].
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::Receiver<NotificationJob>,
}

/// Create a queue holding at most `capacity` jobs (minimum 1).
pub fn task_queue(capacity: usize, policy: OverflowPolicy) -> (TaskQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (TaskQueue { tx, policy }, JobReceiver { rx })
}

impl TaskQueue {
    /// Append `job` to the tail.
    ///
    /// # Errors
    ///
    /// [`NotifyError::QueueFull`] when full under [`OverflowPolicy::Reject`];
    /// [`NotifyError::QueueClosed`] when the receiver has been dropped.
    pub async fn enqueue(&self, job: NotificationJob) -> Result<()> {
        let job_id = job.id;
        let user_id = job.user_id;
        match self.policy {
            OverflowPolicy::Reject => self.tx.try_send(job).map_err(|e| match e {
                TrySendError::Full(_) => {
                    warn!(%job_id, user_id, "notification queue full, rejecting job");
                    NotifyError::QueueFull {
                        capacity: self.capacity(),
                    }
                }
                TrySendError::Closed(_) => NotifyError::QueueClosed,
            })?,
            OverflowPolicy::Wait => self
                .tx
                .send(job)
                .await
                .map_err(|_| NotifyError::QueueClosed)?,
        }
        debug!(%job_id, user_id, depth = self.depth(), "notification job enqueued");
        Ok(())
    }

    /// Jobs currently waiting.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity().saturating_sub(self.tx.capacity())
    }

    /// Maximum number of waiting jobs.
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

impl JobReceiver {
    /// Pop the head job, suspending until one is available.
    ///
    /// Returns `None` once every [`TaskQueue`] handle is dropped and the
    /// queue is drained.
    pub async fn dequeue(&mut self) -> Option<NotificationJob> {
        self.rx.recv().await
    }
}
