//! Worker - queue drain, batch accumulation, send and requeue
//!
//! Each worker owns a local buffer and its own Postman. A batch closes when
//! it reaches `batch_size`, when the queue has been quiet for
//! `flush_timeout`, or when a point with a strictly newer timestamp arrives
//! (producers feed per-timestamp groups; one POST maps to one sample
//! bucket). The size trigger wins over a concurrently-firing timer because
//! it is checked inline on receive.
//!
//! On a failed send every point of the batch is pushed back into the queue
//! until it refuses a slot; the failure is reported exactly once on the
//! error stream, carrying the `requeued/total` tally.

use std::sync::Arc;
use std::time::Duration;

use crossfire::{MAsyncRx, MAsyncTx};
use opentsdb_protocol::DataPoint;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{try_push, ClientMetrics};
use crate::error::ClientError;
use crate::postman::Postman;

pub(crate) struct Worker {
    id: usize,
    url: String,
    queue_rx: MAsyncRx<DataPoint>,
    queue_tx: MAsyncTx<DataPoint>,
    postman: Postman,
    batch_size: usize,
    flush_timeout: Duration,
    metrics: Arc<ClientMetrics>,
    errors_tx: mpsc::Sender<ClientError>,
    cancel: CancellationToken,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: usize,
        url: String,
        queue_rx: MAsyncRx<DataPoint>,
        queue_tx: MAsyncTx<DataPoint>,
        http_timeout: Duration,
        batch_size: usize,
        flush_timeout: Duration,
        metrics: Arc<ClientMetrics>,
        errors_tx: mpsc::Sender<ClientError>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            url,
            queue_rx,
            queue_tx,
            postman: Postman::new(http_timeout),
            batch_size,
            flush_timeout,
            metrics,
            errors_tx,
            cancel,
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::debug!(worker = self.id, "worker starting");

        let mut buffer: Vec<DataPoint> = Vec::with_capacity(self.batch_size);
        let mut prev_ts = i64::MIN;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.drain(&mut buffer).await;
                    break;
                }
                result = self.queue_rx.recv() => match result {
                    Ok(dp) => {
                        // A strictly newer timestamp closes the previous
                        // sample bucket.
                        if dp.timestamp > prev_ts && !buffer.is_empty() {
                            self.flush(&mut buffer, true).await;
                        }
                        prev_ts = dp.timestamp;
                        buffer.push(dp);
                        if buffer.len() >= self.batch_size {
                            self.flush(&mut buffer, true).await;
                        }
                    }
                    Err(_) => {
                        // All producers gone - flush and exit.
                        self.flush(&mut buffer, false).await;
                        break;
                    }
                },
                _ = tokio::time::sleep(self.flush_timeout), if !buffer.is_empty() => {
                    self.flush(&mut buffer, true).await;
                }
            }
        }

        tracing::debug!(worker = self.id, "worker stopped");
    }

    /// Pull whatever is already queued and flush it, without requeueing.
    ///
    /// Runs once at teardown. Requeueing here would bounce failed points
    /// between the queue and this loop forever.
    async fn drain(&mut self, buffer: &mut Vec<DataPoint>) {
        while let Ok(dp) = self.queue_rx.try_recv() {
            buffer.push(dp);
            if buffer.len() >= self.batch_size {
                self.flush(buffer, false).await;
            }
        }
        self.flush(buffer, false).await;
    }

    /// Hand the buffered points to the Postman; never sends an empty batch
    async fn flush(&mut self, buffer: &mut Vec<DataPoint>, requeue: bool) {
        if buffer.is_empty() {
            return;
        }
        let batch = std::mem::replace(buffer, Vec::with_capacity(self.batch_size));
        self.send(batch, requeue).await;
    }

    async fn send(&mut self, batch: Vec<DataPoint>, requeue: bool) {
        let started = Instant::now();

        match self.postman.post(&batch, &self.url).await {
            Ok(()) => {
                self.metrics.record_sent(batch.len() as u64);
                tracing::debug!(
                    worker = self.id,
                    points = batch.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "batch delivered"
                );
            }
            Err(err) => {
                let total = batch.len();
                let mut requeued = 0;
                if requeue {
                    for dp in batch {
                        if try_push(&self.queue_tx, &self.metrics, dp).is_err() {
                            break;
                        }
                        requeued += 1;
                    }
                    if requeued < total {
                        tracing::warn!(
                            worker = self.id,
                            requeued,
                            total,
                            "queue refused part of a failed batch"
                        );
                    }
                }

                let report = ClientError::SendFailed {
                    source: err,
                    requeued,
                    total,
                };
                if self.errors_tx.send(report).await.is_err() {
                    tracing::warn!(
                        worker = self.id,
                        "error stream closed, dropping send-failure report"
                    );
                }
            }
        }
    }
}
