//! Client facade - queue, worker pool, counters, error stream
//!
//! The client owns the bounded MPMC queue producers push into, the worker
//! tasks that drain it, and the error stream failures are reported on. All
//! of it lives for the client's lifetime; `shutdown` stops the workers,
//! drains what is left in the queue, and closes the error stream.

use std::net::ToSocketAddrs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossfire::{MAsyncRx, MAsyncTx, TrySendError};
use opentsdb_protocol::DataPoint;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::worker::Worker;
use crate::{Result, ERROR_STREAM_CAPACITY};

/// Counters for the write pipeline
///
/// Both counters are monotone non-decreasing. Read them through the client's
/// accessors; the atomics themselves never escape.
#[derive(Debug, Default)]
pub struct ClientMetrics {
    /// Points acknowledged by the server (incremented per successful batch)
    sent: AtomicU64,

    /// Points refused by a full queue
    dropped: AtomicU64,
}

impl ClientMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Record a delivered batch of `n` points
    #[inline]
    pub(crate) fn record_sent(&self, n: u64) {
        self.sent.fetch_add(n, Ordering::Relaxed);
    }

    /// Record one dropped point
    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Points acknowledged by the server
    #[inline]
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Points dropped on a full queue
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Get snapshot of both counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent(),
            dropped: self.dropped(),
        }
    }
}

/// Point-in-time snapshot of client counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sent: u64,
    pub dropped: u64,
}

/// Ingestion client for one OpenTSDB endpoint
#[derive(Debug)]
pub struct Client {
    /// Full `/api/put` URL
    url: String,

    /// Producer side of the data-point queue
    queue_tx: MAsyncTx<DataPoint>,

    /// Consumer side, cloned into each worker; dropped on shutdown so the
    /// queue disconnects once the workers are gone
    queue_rx: Mutex<Option<MAsyncRx<DataPoint>>>,

    /// Per-request timeout handed to each worker's Postman
    http_timeout: Duration,

    /// Shared counters
    metrics: Arc<ClientMetrics>,

    /// Error-stream sender; taken on shutdown so the stream closes
    errors_tx: Mutex<Option<mpsc::Sender<ClientError>>>,

    /// Error-stream receiver until the caller claims it
    errors_rx: Mutex<Option<mpsc::Receiver<ClientError>>>,

    /// Cancels all worker loops
    cancel: CancellationToken,

    /// Running worker tasks
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Client {
    /// Create a client for `host` (a `host:port` pair).
    ///
    /// The host is resolved once up front so a bad address fails here
    /// instead of on the first batch. `buffer_size` bounds the data-point
    /// queue; `http_timeout` applies to each POST.
    pub fn new(host: &str, buffer_size: usize, http_timeout: Duration) -> Result<Self> {
        let mut addrs = host
            .to_socket_addrs()
            .map_err(|e| ClientError::InvalidHost {
                host: host.to_string(),
                reason: e.to_string(),
            })?;
        if addrs.next().is_none() {
            return Err(ClientError::InvalidHost {
                host: host.to_string(),
                reason: "no addresses found".to_string(),
            });
        }

        let (queue_tx, queue_rx) = crossfire::mpmc::bounded_async(buffer_size);
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_STREAM_CAPACITY);

        Ok(Self {
            url: format!("http://{host}/api/put"),
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            http_timeout,
            metrics: Arc::new(ClientMetrics::new()),
            errors_tx: Mutex::new(Some(errors_tx)),
            errors_rx: Mutex::new(Some(errors_rx)),
            cancel: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Push one data point onto the queue without blocking.
    ///
    /// A full queue refuses the point, counts it as dropped and returns
    /// [`ClientError::QueueFull`]; the producer decides whether to retry.
    pub fn push(&self, dp: DataPoint) -> Result<()> {
        try_push(&self.queue_tx, &self.metrics, dp)
    }

    /// Spawn `workers` batching tasks.
    ///
    /// Each worker accumulates up to `batch_size` points and flushes on
    /// size, after `flush_timeout` of quiescence, or when a point with a
    /// strictly newer timestamp arrives.
    pub fn start_workers(&self, workers: usize, batch_size: usize, flush_timeout: Duration) {
        let Some(errors_tx) = self.errors_tx.lock().clone() else {
            tracing::warn!("start_workers called after shutdown, ignoring");
            return;
        };
        let Some(queue_rx) = self.queue_rx.lock().clone() else {
            tracing::warn!("start_workers called after shutdown, ignoring");
            return;
        };

        let mut handles = self.workers.lock();
        for id in handles.len()..handles.len() + workers {
            let worker = Worker::new(
                id,
                self.url.clone(),
                queue_rx.clone(),
                self.queue_tx.clone(),
                self.http_timeout,
                batch_size,
                flush_timeout,
                Arc::clone(&self.metrics),
                errors_tx.clone(),
                self.cancel.child_token(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        tracing::info!(
            workers,
            batch_size,
            flush_timeout_ms = flush_timeout.as_millis() as u64,
            url = %self.url,
            "workers started"
        );
    }

    /// Claim the error stream.
    ///
    /// Delivery failures are reported here exactly once per failed batch.
    /// The stream has small bounded capacity; callers must drain it or
    /// workers will stall on error floods. Returns `None` after the first
    /// call.
    pub fn take_errors(&self) -> Option<mpsc::Receiver<ClientError>> {
        self.errors_rx.lock().take()
    }

    /// Points acknowledged by the server
    pub fn sent(&self) -> u64 {
        self.metrics.sent()
    }

    /// Points dropped on a full queue
    pub fn dropped(&self) -> u64 {
        self.metrics.dropped()
    }

    /// Snapshot of both counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop the workers.
    ///
    /// Workers flush their buffers and whatever is still queued, then exit;
    /// batches that fail during teardown are not requeued. The error stream
    /// closes once the last worker is gone.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.errors_tx.lock().take();

        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "worker task panicked during shutdown");
            }
        }

        // The last receiver is gone with the workers; dropping ours
        // disconnects producers for good.
        self.queue_rx.lock().take();

        tracing::info!(url = %self.url, "client shut down");
    }
}

/// Non-blocking push shared by producers and the requeue path
pub(crate) fn try_push(
    queue_tx: &MAsyncTx<DataPoint>,
    metrics: &ClientMetrics,
    dp: DataPoint,
) -> Result<()> {
    match queue_tx.try_send(dp) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            metrics.record_dropped();
            Err(ClientError::QueueFull)
        }
        Err(TrySendError::Disconnected(_)) => Err(ClientError::Closed),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
