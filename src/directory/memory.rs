//! In-process directory
//!
//! Holds integration records in memory. Used by the CLI (records come from
//! the workspace file) and by tests, which can also flip it unavailable and
//! count how often it was queried.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{IntegrationDirectory, IntegrationRecord};
use crate::error::{Result, VcsError};
use crate::provider::ProviderKind;

/// Directory backed by a list of records
#[derive(Debug)]
pub struct MemoryDirectory {
    records: Vec<IntegrationRecord>,
    available: AtomicBool,
    /// Number of queries served (for assertions)
    calls: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::with_records(vec![])
    }

    pub fn with_records(records: Vec<IntegrationRecord>) -> Self {
        Self {
            records,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a record
    pub fn with_record(mut self, record: IntegrationRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(&self) -> &[IntegrationRecord] {
        &self.records
    }

    /// Simulate an outage: every query fails with `DirectoryUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Queries served so far, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(VcsError::DirectoryUnavailable {
                reason: "in-memory directory marked unavailable".to_string(),
            })
        }
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationDirectory for MemoryDirectory {
    fn find_default_integrations(
        &self,
        kind: ProviderKind,
        space: &str,
    ) -> Result<Vec<IntegrationRecord>> {
        self.begin_call()?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind == kind && r.is_default && r.space == space)
            .cloned()
            .collect())
    }

    fn find_integration(&self, kind: ProviderKind, id: &str) -> Result<Option<IntegrationRecord>> {
        self.begin_call()?;
        Ok(self.records.iter().find(|r| r.kind == kind && r.id == id).cloned())
    }
}
