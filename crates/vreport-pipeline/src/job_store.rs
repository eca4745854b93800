//! Job record storage seam.
//!
//! Job state lives behind a keyed store interface rather than a
//! process-wide registry, so callers choose the backing and its
//! lifetime. The in-memory store suits a single process; a shared
//! deployment would implement [`JobStore`] over its own backing.

use std::collections::HashMap;
use std::sync::RwLock;

use vreport_models::{JobId, JobRecord};

use crate::error::{PipelineError, PipelineResult};

/// Keyed storage for job records.
pub trait JobStore: Send + Sync {
    /// Insert or replace the record for its job id.
    fn put(&self, record: JobRecord) -> PipelineResult<()>;

    /// Fetch a record by job id.
    fn get(&self, job_id: &JobId) -> PipelineResult<Option<JobRecord>>;

    /// Remove a record. Removing an absent id is not an error.
    fn delete(&self, job_id: &JobId) -> PipelineResult<()>;
}

/// Process-local store backed by a `RwLock`ed map.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    records: RwLock<HashMap<String, JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn put(&self, record: JobRecord) -> PipelineResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PipelineError::fatal("job store lock poisoned"))?;
        records.insert(record.job_id.as_str().to_string(), record);
        Ok(())
    }

    fn get(&self, job_id: &JobId) -> PipelineResult<Option<JobRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| PipelineError::fatal("job store lock poisoned"))?;
        Ok(records.get(job_id.as_str()).cloned())
    }

    fn delete(&self, job_id: &JobId) -> PipelineResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PipelineError::fatal("job store lock poisoned"))?;
        records.remove(job_id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vreport_models::PipelineStage;

    #[test]
    fn test_put_get_delete_round_trip() {
        let store = InMemoryJobStore::new();
        let record = JobRecord::new(JobId::new(), "https://example.com/v");
        let job_id = record.job_id.clone();

        store.put(record).unwrap();
        let fetched = store.get(&job_id).unwrap().unwrap();
        assert_eq!(fetched.source_url, "https://example.com/v");
        assert_eq!(fetched.stage, PipelineStage::Captioning);

        store.delete(&job_id).unwrap();
        assert!(store.get(&job_id).unwrap().is_none());
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let store = InMemoryJobStore::new();
        assert!(store.get(&JobId::new()).unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_existing_record() {
        let store = InMemoryJobStore::new();
        let record = JobRecord::new(JobId::new(), "https://example.com/v");
        let job_id = record.job_id.clone();
        store.put(record.clone()).unwrap();

        store
            .put(record.advance(PipelineStage::Summarizing, 25, "Summarizing transcript"))
            .unwrap();

        let fetched = store.get(&job_id).unwrap().unwrap();
        assert_eq!(fetched.stage, PipelineStage::Summarizing);
        assert_eq!(fetched.progress, 25);
    }
}
