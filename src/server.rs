//! Service lifecycle: store, queue, worker, and HTTP listener.
//!
//! [`NotifyService::start`] wires every component explicitly; nothing lives
//! in process-wide globals, so tests can run isolated instances side by side.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::{AppState, build_router};
use crate::config::ServiceConfig;
use crate::error::{NotifyError, Result};
use crate::notifications::{
    DeliverySink, LogSink, NotificationDispatcher, NotificationWorker, SupervisorPolicy,
    WorkerHandle, WorkerMonitor, WorkerStats, task_queue,
};
use crate::preferences::{PreferenceService, PreferenceStore, SqlitePreferenceStore};

/// A running notification preference service.
pub struct NotifyService {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Background server task.
    server: Option<JoinHandle<()>>,
    /// Fires graceful shutdown of the listener.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// The single notification worker.
    worker: Option<WorkerHandle>,
    monitor: WorkerMonitor,
}

impl NotifyService {
    /// Start with the SQLite store at `config.store.db_path` and log-only delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the database cannot be
    /// opened, or the listener cannot bind.
    pub async fn start(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let store = SqlitePreferenceStore::open(&config.store.db_path)?;
        Self::start_with(config, Arc::new(store), Arc::new(LogSink)).await
    }

    /// Start with an explicit store and delivery sink.
    pub async fn start_with(
        config: &ServiceConfig,
        store: Arc<dyn PreferenceStore>,
        sink: Arc<dyn DeliverySink>,
    ) -> Result<Self> {
        let (queue, receiver) = task_queue(config.queue.capacity, config.queue.overflow);
        let worker = NotificationWorker::new(sink)
            .with_policy(SupervisorPolicy::from(&config.worker))
            .spawn(receiver);
        let monitor = worker.monitor();

        let preferences = PreferenceService::new(store);
        let state = AppState {
            dispatcher: NotificationDispatcher::new(preferences.clone(), queue),
            preferences,
            worker: monitor.clone(),
        };
        let app = build_router(state);

        let bind_addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            NotifyError::Config(format!("cannot bind HTTP listener on {bind_addr}: {e}"))
        })?;
        let addr = listener.local_addr()?;

        info!(
            capacity = config.queue.capacity,
            overflow = ?config.queue.overflow,
            "notify-prefs listening on http://{addr}"
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("HTTP server error: {e}");
            }
        });

        Ok(Self {
            addr,
            server: Some(server),
            shutdown_tx: Some(shutdown_tx),
            worker: Some(worker),
            monitor,
        })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Observe the notification worker.
    pub fn worker(&self) -> WorkerMonitor {
        self.monitor.clone()
    }

    /// Stop accepting requests, then wait for the worker to drain every
    /// job already queued.
    pub async fn shutdown(mut self) -> WorkerStats {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            if let Err(e) = server.await {
                error!("HTTP server task failed: {e}");
            }
        }
        // The router owned the last producer handle; the worker now sees
        // a closed queue once it has drained.
        let stats = match self.worker.take() {
            Some(worker) => worker.join().await,
            None => self.monitor.stats(),
        };
        info!(
            processed = stats.processed,
            panics = stats.panics,
            restarts = stats.restarts,
            "notify-prefs shut down"
        );
        stats
    }
}

impl Drop for NotifyService {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}
