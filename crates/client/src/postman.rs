//! Postman - per-worker HTTP sender
//!
//! One Postman belongs to one worker: it owns a gzip scratch buffer that is
//! reused across requests, so it must not be shared. The underlying
//! `reqwest::Client` keeps an idle-connection pool per host to amortize
//! connection setup across batches.

use std::time::Duration;

use opentsdb_protocol::DataPoint;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::encode::encode_batch_into;
use crate::error::PostError;
use crate::MAX_IDLE_CONNECTIONS;

/// Longest response-body snippet carried inside a `BadStatus` error
const BODY_SNIPPET_MAX: usize = 512;

/// HTTP sender for gzip JSON batches
pub struct Postman {
    client: reqwest::Client,

    /// Gzip scratch buffer, reused across posts
    buf: Vec<u8>,
}

impl Postman {
    /// Create a Postman with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()
            .unwrap_or_default();

        Self {
            client,
            buf: Vec::new(),
        }
    }

    /// POST one batch to `url`.
    ///
    /// Success is exactly `204 No Content`. Any other status reads the body
    /// to EOF and fails with [`PostError::BadStatus`]; transport problems
    /// (connect, reset, timeout) fail with [`PostError::Transport`].
    pub async fn post(&mut self, batch: &[DataPoint], url: &str) -> Result<(), PostError> {
        encode_batch_into(batch, &mut self.buf)?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, "gzip")
            .body(self.buf.clone())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PostError::BadStatus {
            status: status.as_u16(),
            body: snippet(body),
        })
    }
}

/// Truncate a response body to a loggable snippet on a char boundary
fn snippet(mut body: String) -> String {
    if body.len() > BODY_SNIPPET_MAX {
        let mut end = BODY_SNIPPET_MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

#[cfg(test)]
#[path = "postman_test.rs"]
mod postman_test;
