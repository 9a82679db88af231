use domain::DomainError;
use infrastructure::config::AlertingConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::lifecycle::{AlertJob, AlertJobHandler};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("alert queue is full")]
    QueueFull,
    #[error("alert dispatcher is shut down")]
    Closed,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    rejected_full: AtomicU64,
    rejected_closed: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

/// Point-in-time copy of the dispatcher counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherStats {
    pub submitted: u64,
    pub rejected_full: u64,
    pub rejected_closed: u64,
    pub processed: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub queued: usize,
}

/// Bounded queue of alert jobs consumed by a fixed pool of workers.
///
/// `submit` never waits: a full queue rejects the job. `shutdown` stops
/// intake, lets the workers drain what is already queued and aborts them
/// once the grace period runs out.
pub struct AlertDispatcher {
    sender: StdMutex<Option<mpsc::Sender<AlertJob>>>,
    capacity: usize,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    cancel_token: CancellationToken,
    shutdown_grace: Duration,
}

impl AlertDispatcher {
    /// Spawn the worker pool. Must be called inside a tokio runtime.
    pub fn new(handler: Arc<dyn AlertJobHandler>, config: &AlertingConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());
        let cancel_token = CancellationToken::new();
        let job_timeout = config.job_timeout();

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    rx.clone(),
                    handler.clone(),
                    counters.clone(),
                    cancel_token.clone(),
                    job_timeout,
                ))
            })
            .collect();

        info!(
            workers = config.workers.max(1),
            capacity, "🚀 Alert dispatcher started"
        );

        Self {
            sender: StdMutex::new(Some(tx)),
            capacity,
            workers: Mutex::new(workers),
            counters,
            cancel_token,
            shutdown_grace: config.shutdown_grace(),
        }
    }

    /// Queue a job without waiting
    pub fn submit(&self, job: AlertJob) -> Result<(), SubmitError> {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            self.counters.rejected_closed.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::Closed);
        };

        match sender.try_send(job) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.counters.rejected_full.fetch_add(1, Ordering::Relaxed);
                warn!(
                    asset_sensor_id = %job.asset_sensor_id,
                    field = %job.measurement_field,
                    "Alert queue full, dropping job"
                );
                Err(SubmitError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.counters.rejected_closed.fetch_add(1, Ordering::Relaxed);
                Err(SubmitError::Closed)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    pub fn stats(&self) -> DispatcherStats {
        let queued = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, |s| self.capacity - s.capacity());

        DispatcherStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            rejected_full: self.counters.rejected_full.load(Ordering::Relaxed),
            rejected_closed: self.counters.rejected_closed.load(Ordering::Relaxed),
            processed: self.counters.processed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
            queued,
        }
    }

    /// Stop intake and drain. Returns true when every worker finished
    /// inside the grace period.
    pub async fn shutdown(&self) -> bool {
        // Dropping the only sender closes the queue; workers exit once it is empty
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if sender.is_none() {
            return true;
        }
        drop(sender);

        let mut workers = self.workers.lock().await;
        let handles: Vec<JoinHandle<()>> = workers.drain(..).collect();
        let abort_handles: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        let drained = tokio::time::timeout(self.shutdown_grace, async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!(error = %e, "Alert worker panicked");
                }
            }
        })
        .await
        .is_ok();

        if drained {
            info!("Alert dispatcher drained and stopped");
        } else {
            warn!(
                grace_ms = self.shutdown_grace.as_millis() as u64,
                "Alert dispatcher did not drain in time, aborting workers"
            );
            self.cancel_token.cancel();
            for handle in abort_handles {
                handle.abort();
            }
        }
        drained
    }
}

async fn run_worker(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<AlertJob>>>,
    handler: Arc<dyn AlertJobHandler>,
    counters: Arc<Counters>,
    cancel_token: CancellationToken,
    job_timeout: Duration,
) {
    debug!(worker_id, "Alert worker started");

    loop {
        let job = {
            let mut rx = rx.lock().await;
            tokio::select! {
                _ = cancel_token.cancelled() => None,
                job = rx.recv() => job,
            }
        };
        let Some(job) = job else { break };

        // A panicking handler takes down only its own task, never the worker
        let task = {
            let handler = handler.clone();
            let job = job.clone();
            let cancel_token = cancel_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel_token.cancelled() => Err(DomainError::Cancelled),
                    result = handler.handle(&job) => result,
                }
            })
        };
        let abort_handle = task.abort_handle();

        tokio::select! {
            _ = cancel_token.cancelled() => {
                abort_handle.abort();
                break;
            }
            result = tokio::time::timeout(job_timeout, task) => match result {
                Ok(Ok(Ok(transition))) => {
                    counters.processed.fetch_add(1, Ordering::Relaxed);
                    debug!(worker_id, ?transition, "Alert job processed");
                }
                Ok(Ok(Err(e))) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        worker_id,
                        asset_sensor_id = %job.asset_sensor_id,
                        field = %job.measurement_field,
                        error = %e,
                        "Alert job failed"
                    );
                }
                Ok(Err(join_error)) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        worker_id,
                        asset_sensor_id = %job.asset_sensor_id,
                        field = %job.measurement_field,
                        error = %join_error,
                        "Alert job panicked"
                    );
                }
                Err(_) => {
                    abort_handle.abort();
                    counters.timed_out.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        worker_id,
                        asset_sensor_id = %job.asset_sensor_id,
                        field = %job.measurement_field,
                        timeout_ms = job_timeout.as_millis() as u64,
                        "Alert job timed out"
                    );
                }
            }
        }
    }

    debug!(worker_id, "Alert worker stopped");
}
