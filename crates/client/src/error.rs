//! Error types for the ingestion pipeline
//!
//! Producers only ever see [`ClientError::QueueFull`] synchronously; delivery
//! failures travel out-of-band on the client's error stream as
//! [`ClientError::SendFailed`].

use thiserror::Error;

/// Errors that can occur while framing a batch body
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing into the gzip stream failed
    #[error("gzip framing failed: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Errors from a single POST attempt
#[derive(Debug, Error)]
pub enum PostError {
    /// Batch could not be turned into a request body
    #[error("failed to encode batch: {0}")]
    Encode(#[from] EncodeError),

    /// Request did not complete (connect, reset, timeout, cancellation)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with something other than `204 No Content`
    #[error("unexpected status {status} ({body:?})")]
    BadStatus {
        /// HTTP status code
        status: u16,
        /// Response body, truncated for reporting
        body: String,
    },
}

/// Errors surfaced by the client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Host did not resolve at construction time
    #[error("failed to resolve tsdb host {host:?}: {reason}")]
    InvalidHost {
        /// The host string as given
        host: String,
        /// Resolver failure detail
        reason: String,
    },

    /// Queue had no free slot for the data point
    #[error("failed to push datapoint, queue is full")]
    QueueFull,

    /// Client has been shut down
    #[error("client is shut down")]
    Closed,

    /// A batch could not be delivered
    ///
    /// `requeued` of `total` points were pushed back into the queue before
    /// it refused a slot; the rest are gone.
    #[error("request failed: {source} (requeued {requeued}/{total})")]
    SendFailed {
        /// The failed POST
        #[source]
        source: PostError,
        /// Points put back into the queue
        requeued: usize,
        /// Points in the failed batch
        total: usize,
    },
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
