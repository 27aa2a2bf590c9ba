//! Asynchronous notification dispatch.
//!
//! Request handlers act as producers: [`NotificationDispatcher::schedule`]
//! snapshots a user's preferences into a [`NotificationJob`] and pushes it
//! onto the bounded [`TaskQueue`]. A single supervised [`NotificationWorker`]
//! drains the queue in FIFO order and hands each job to a [`DeliverySink`].

pub mod dispatch;
pub mod job;
pub mod queue;
pub mod worker;

pub use dispatch::{NotificationDispatcher, ScheduleOutcome};
pub use job::{Channel, NotificationJob, describe_channels};
pub use queue::{JobReceiver, OverflowPolicy, TaskQueue, task_queue};
pub use worker::{
    DeliverySink, LogSink, NotificationWorker, SupervisorPolicy, WorkerHandle, WorkerMonitor,
    WorkerState, WorkerStats,
};
