//! Fixed, in-memory card source.

use crate::error::Result;
use crate::traits::SourceCollector;
use std::sync::{Arc, RwLock};

/// Serves a list of records held in memory.
///
/// Cloning shares the underlying list, so a host can keep one handle and
/// `replace` the records while a refresher holds another.
#[derive(Debug, Clone, Default)]
pub struct StaticCollector {
    records: Arc<RwLock<Vec<String>>>,
}

impl StaticCollector {
    pub fn new<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().map(Into::into).collect())),
        }
    }

    /// Swap in a new list; the next fetch sees it.
    pub fn replace<I, S>(&self, records: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records: Vec<String> = records.into_iter().map(Into::into).collect();
        *self.records.write().unwrap_or_else(|e| e.into_inner()) = records;
    }
}

impl SourceCollector for StaticCollector {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_raw_records(&self) -> Result<Vec<String>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}
