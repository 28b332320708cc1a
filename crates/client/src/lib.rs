//! OpenTSDB Client - background ingestion pipeline
//!
//! Producers hand data points to a [`Client`]; worker tasks batch them in the
//! background and POST gzip-compressed JSON to the `/api/put` endpoint.
//! Failed batches are pushed back into the queue, bounded only by its
//! capacity, and every failure is reported once on an out-of-band error
//! stream.
//!
//! ```text
//! [producer] --push--> [bounded MPMC queue] --> [worker 0..N]
//!                                                  |  batch on size /
//!                                                  |  quiescence / new
//!                                                  |  timestamp bucket
//!                                                  v
//!                                              [Postman] --POST--> tsdb
//!                                                  |
//!                               failure: requeue + one report on Errors
//! ```
//!
//! # Example
//!
//! ```ignore
//! use opentsdb_client::Client;
//! use opentsdb_protocol::{DataPoint, Tags};
//! use std::time::Duration;
//!
//! let client = Client::new("tsdb.example.com:4242", 10_000, Duration::from_secs(5))?;
//! client.start_workers(4, 1_000, Duration::from_secs(10));
//!
//! let mut tags = Tags::new();
//! tags.set("host", "web01");
//! client.push(DataPoint::new("sys.cpu.user", 1356998400, 42i64, tags))?;
//! ```
//!
//! # Delivery contract
//!
//! Best effort, not at-least-once: a full queue drops on `push` (counted in
//! `dropped`), and points inside an in-flight request at shutdown may be
//! lost. `sent` counts points acknowledged with `204 No Content`.

mod client;
mod encode;
mod error;
mod postman;
mod worker;

pub use client::{Client, ClientMetrics, MetricsSnapshot};
pub use encode::encode_batch;
pub use error::{ClientError, EncodeError, PostError};
pub use postman::Postman;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Capacity of the out-of-band error stream
pub const ERROR_STREAM_CAPACITY: usize = 10;

/// Idle connections kept per host by each Postman
pub const MAX_IDLE_CONNECTIONS: usize = 100;
