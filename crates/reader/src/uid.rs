//! UID resolver - cache-backed UID/name translation
//!
//! The storage layer replaces every metric name, tag key and tag value with
//! a 3-byte UID. The UID table maps both directions: a name row holds the
//! UID, a UID row holds the name, and the cell qualifier names the kind.
//!
//! The UID space is small and stable, so the three caches are unbounded and
//! append-only for the life of the process. Lookup misses degrade to an
//! empty name instead of failing the scan.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::store::{Store, StoreError, UID_TABLE};

/// The three UID namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UidKind {
    /// Metric names
    Metric,
    /// Tag keys
    TagKey,
    /// Tag values
    TagValue,
}

impl UidKind {
    /// The cell qualifier marking this kind in the UID table
    #[inline]
    pub const fn qualifier(self) -> &'static [u8] {
        match self {
            Self::Metric => b"metrics",
            Self::TagKey => b"tagk",
            Self::TagValue => b"tagv",
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::TagKey => "tagk",
            Self::TagValue => "tagv",
        }
    }
}

impl fmt::Display for UidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cache-backed UID/name resolver, shared by all readers of one store
pub struct UidResolver {
    store: Arc<dyn Store>,

    /// UID -> name, one cache per kind
    metrics: Mutex<HashMap<Vec<u8>, String>>,
    tagk: Mutex<HashMap<Vec<u8>, String>>,
    tagv: Mutex<HashMap<Vec<u8>, String>>,
}

impl UidResolver {
    /// Create a resolver with empty caches
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            metrics: Mutex::new(HashMap::new()),
            tagk: Mutex::new(HashMap::new()),
            tagv: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self, kind: UidKind) -> &Mutex<HashMap<Vec<u8>, String>> {
        match kind {
            UidKind::Metric => &self.metrics,
            UidKind::TagKey => &self.tagk,
            UidKind::TagValue => &self.tagv,
        }
    }

    /// Resolve a UID to its name.
    ///
    /// Unknown UIDs and store failures resolve to the empty string; the
    /// caller keeps decoding with blank names rather than losing the point.
    /// Only successful lookups are cached.
    pub async fn name(&self, kind: UidKind, uid: &[u8]) -> String {
        if let Some(hit) = self.cache(kind).lock().get(uid) {
            return hit.clone();
        }

        match self.lookup(kind, uid).await {
            Ok(Some(name)) => {
                self.cache(kind)
                    .lock()
                    .insert(uid.to_vec(), name.clone());
                name
            }
            Ok(None) => {
                tracing::debug!(kind = %kind, uid = ?uid, "uid has no name");
                String::new()
            }
            Err(e) => {
                tracing::warn!(kind = %kind, uid = ?uid, error = %e, "uid lookup failed");
                String::new()
            }
        }
    }

    async fn lookup(&self, kind: UidKind, uid: &[u8]) -> Result<Option<String>, StoreError> {
        let cells = self.store.get(UID_TABLE, uid).await?;
        for cell in cells {
            if cell.qualifier == kind.qualifier() {
                return Ok(Some(String::from_utf8_lossy(&cell.value).into_owned()));
            }
        }
        Ok(None)
    }

    /// Find every `name -> UID` mapping of `kind` whose name starts with
    /// `prefix`. The result is ordered by name.
    pub async fn find(
        &self,
        kind: UidKind,
        prefix: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        let rows = self
            .store
            .scan_prefix(UID_TABLE, prefix.as_bytes(), kind.qualifier())
            .await?;

        let mut found = BTreeMap::new();
        for row in rows {
            let name = String::from_utf8_lossy(&row.key).into_owned();
            if let Some(cell) = row.cells.into_iter().next() {
                found.insert(name, cell.value);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
#[path = "uid_test.rs"]
mod uid_test;
