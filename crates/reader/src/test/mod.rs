//! Test stores
//!
//! A sorted-map [`Store`] implementation for reader tests and examples. It
//! keeps the byte-ordering semantics of the real store (range scans walk
//! keys in ascending order) without any RPC underneath.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::store::{Cell, Row, Store, StoreError, UID_TABLE};
use crate::uid::UidKind;

type Table = BTreeMap<Vec<u8>, Vec<(Vec<u8>, Vec<u8>)>>;

/// In-memory wide-column store backed by sorted maps
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Table>>,

    /// Row gets served so far (cache behavior is observable in tests)
    gets: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one cell
    pub fn put(&self, table: &str, key: &[u8], qualifier: &[u8], value: &[u8]) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .entry(key.to_vec())
            .or_default()
            .push((qualifier.to_vec(), value.to_vec()));
    }

    /// Register a UID mapping in both directions, the way the UID table
    /// stores it: the name row holds the UID, the UID row holds the name.
    pub fn put_uid(&self, kind: UidKind, name: &str, uid: &[u8]) {
        self.put(UID_TABLE, uid, kind.qualifier(), name.as_bytes());
        self.put(UID_TABLE, name.as_bytes(), kind.qualifier(), uid);
    }

    /// Number of single-row gets served
    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn scan_range(
        &self,
        table: &str,
        start_key: &[u8],
        end_key: &[u8],
        _deadline: Duration,
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock();
        let Some(table) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let range = (
            Bound::Included(start_key.to_vec()),
            Bound::Excluded(end_key.to_vec()),
        );
        Ok(table
            .range(range)
            .map(|(key, cells)| Row {
                key: key.clone(),
                cells: cells
                    .iter()
                    .map(|(qualifier, value)| Cell {
                        qualifier: qualifier.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn scan_prefix(
        &self,
        table: &str,
        prefix: &[u8],
        qualifier: &[u8],
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock();
        let Some(table) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for (key, cells) in table.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let matching: Vec<Cell> = cells
                .iter()
                .filter(|(q, _)| q.as_slice() == qualifier)
                .map(|(q, value)| Cell {
                    qualifier: q.clone(),
                    value: value.clone(),
                })
                .collect();
            if !matching.is_empty() {
                rows.push(Row {
                    key: key.clone(),
                    cells: matching,
                });
            }
        }
        Ok(rows)
    }

    async fn get(&self, table: &str, key: &[u8]) -> Result<Vec<Cell>, StoreError> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        let tables = self.tables.lock();
        Ok(tables
            .get(table)
            .and_then(|t| t.get(key))
            .map(|cells| {
                cells
                    .iter()
                    .map(|(qualifier, value)| Cell {
                        qualifier: qualifier.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
