//! Row scanner - range scans decoded into data points
//!
//! A scan covers `[start, end]` inclusive on both sides. Row keys only
//! address whole hours, so the key range is widened to hour boundaries and
//! decoded points are filtered back to the requested range afterwards; a
//! point exactly at `end` survives the filter.
//!
//! Corrupt cells are logged and skipped; one bad cell never fails the scan.

use std::sync::Arc;
use std::time::Duration;

use opentsdb_protocol::qualifier::decode_cell;
use opentsdb_protocol::{rowkey, DataPoint, RowKey, Tags};

use crate::error::ReaderError;
use crate::store::{Store, DATA_TABLE};
use crate::uid::{UidKind, UidResolver};
use crate::Result;

/// Deadline applied to every data-table scan
pub const SCAN_DEADLINE: Duration = Duration::from_secs(90);

/// Read-side client over a wide-column store
pub struct Reader {
    store: Arc<dyn Store>,
    uids: UidResolver,
}

impl Reader {
    /// Create a reader; UID caches start cold and fill as rows decode
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            uids: UidResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// List metric names starting with `prefix`, ascending
    pub async fn find_metrics(&self, prefix: &str) -> Result<Vec<String>> {
        let found = self.uids.find(UidKind::Metric, prefix).await?;
        Ok(found.into_keys().collect())
    }

    /// Collect the tag keys used by `metric` between `start` and `end`.
    ///
    /// Returns sorted unique keys; tag keys whose UID no longer resolves
    /// are left out.
    pub async fn get_tags_for_metric(
        &self,
        start: i64,
        end: i64,
        metric: &str,
    ) -> Result<Vec<String>> {
        let (_, uid) = self.metric_uid(metric).await?;
        let (start_key, end_key) = rowkey::tag_scan_bounds(&uid, start, end);

        let rows = self
            .store
            .scan_range(DATA_TABLE, &start_key, &end_key, SCAN_DEADLINE)
            .await?;

        let mut keys = std::collections::BTreeSet::new();
        for row in &rows {
            let key = match RowKey::parse(&row.key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(error = %e, row_key = ?row.key, "skipping bad row key");
                    continue;
                }
            };
            for (tagk, _) in key.tag_pairs() {
                let name = self.uids.name(UidKind::TagKey, tagk).await;
                if !name.is_empty() {
                    keys.insert(name);
                }
            }
        }
        Ok(keys.into_iter().collect())
    }

    /// Scan `[start, end]` for `metric` and decode every matching point.
    ///
    /// `tag_filter` applies as conjunctive equality: a row survives only if
    /// every filter key is present with exactly the filter value. Points are
    /// emitted in scan order (row-key byte order, cells in store order).
    pub async fn get_datapoints(
        &self,
        start: i64,
        end: i64,
        metric: &str,
        tag_filter: &Tags,
    ) -> Result<Vec<DataPoint>> {
        let (metric_name, uid) = self.metric_uid(metric).await?;
        let (start_key, end_key) = rowkey::scan_bounds(&uid, start, end);

        let rows = self
            .store
            .scan_range(DATA_TABLE, &start_key, &end_key, SCAN_DEADLINE)
            .await?;
        tracing::debug!(
            metric = %metric_name,
            rows = rows.len(),
            start,
            end,
            "scanned data rows"
        );

        let mut points = Vec::new();
        for row in &rows {
            let key = match RowKey::parse(&row.key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(error = %e, row_key = ?row.key, "skipping bad row key");
                    continue;
                }
            };

            // Tag UIDs that fail to resolve become blank names; the point
            // still comes out.
            let mut tags = Tags::new();
            for (tagk, tagv) in key.tag_pairs() {
                let tag_key = self.uids.name(UidKind::TagKey, tagk).await;
                let tag_value = self.uids.name(UidKind::TagValue, tagv).await;
                tags.insert(tag_key, tag_value);
            }

            if !tag_filter
                .iter()
                .all(|(k, v)| tags.get(k) == Some(v))
            {
                continue;
            }

            let base = key.base_timestamp();
            for cell in &row.cells {
                let decoded = match decode_cell(&cell.qualifier, &cell.value) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            qualifier = ?cell.qualifier,
                            "skipping malformed cell"
                        );
                        continue;
                    }
                };

                for point in decoded {
                    let ts = base + i64::from(point.offset_sec);
                    // Hour-aligned bounds over-scan; trim to the requested
                    // range, end inclusive.
                    if ts < start || ts > end {
                        continue;
                    }
                    points.push(DataPoint {
                        metric: metric_name.clone(),
                        timestamp: ts,
                        value: point.value,
                        tags: tags.clone(),
                    });
                }
            }
        }
        Ok(points)
    }

    /// Resolve a metric name to its UID; exactly one match is required
    async fn metric_uid(&self, metric: &str) -> Result<(String, Vec<u8>)> {
        let matches = self.uids.find(UidKind::Metric, metric).await?;
        match matches.len() {
            0 => Err(ReaderError::UnknownMetric(metric.to_string())),
            1 => match matches.into_iter().next() {
                Some(entry) => Ok(entry),
                None => Err(ReaderError::UnknownMetric(metric.to_string())),
            },
            count => Err(ReaderError::AmbiguousMetric {
                metric: metric.to_string(),
                count,
            }),
        }
    }
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod scanner_test;
