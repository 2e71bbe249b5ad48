use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{mask_phone, MotherId, MotherRecord};
use crate::workflows::campaign::CallOutcome;

/// Oldest call log entries are evicted past this many.
const CALL_LOG_CAPACITY: usize = 500;

/// Logged result of a single outreach call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallLogEntry {
    pub mother_id: MotherId,
    pub masked_phone: String,
    pub outcome: CallOutcome,
    pub logged_at: DateTime<Utc>,
}

impl CallLogEntry {
    pub fn for_record(record: &MotherRecord, outcome: CallOutcome) -> Self {
        Self {
            mother_id: record.id.clone(),
            masked_phone: mask_phone(&record.contact.phone),
            outcome,
            logged_at: Utc::now(),
        }
    }
}

/// Storage abstraction so the registry service can be exercised in isolation.
pub trait MotherRepository: Send + Sync {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError>;
    fn insert(&self, record: MotherRecord) -> Result<MotherRecord, RepositoryError>;
    fn update(&self, record: MotherRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError>;
    fn log_call(&self, entry: CallLogEntry) -> Result<(), RepositoryError>;
    fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError>;

    /// Apply `change` to the stored record and persist it.
    ///
    /// The default reads then writes. Stores that can hold a lock across the
    /// change override it so overlapping writers never drop an update.
    fn modify<F>(&self, id: &MotherId, change: F) -> Result<MotherRecord, RepositoryError>
    where
        F: FnOnce(&mut MotherRecord),
    {
        let mut record = self.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        change(&mut record);
        self.update(record.clone())?;
        Ok(record)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
struct MemoryState {
    order: Vec<MotherId>,
    records: HashMap<MotherId, MotherRecord>,
    call_logs: VecDeque<CallLogEntry>,
}

/// Process-local store keeping registration order for dashboard listings.
#[derive(Default, Clone)]
pub struct InMemoryMotherRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryMotherRepository {
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl MotherRepository for InMemoryMotherRepository {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .order
            .iter()
            .filter_map(|id| guard.records.get(id).cloned())
            .collect())
    }

    fn insert(&self, record: MotherRecord) -> Result<MotherRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.id.clone());
        guard.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: MotherRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(id).cloned())
    }

    fn log_call(&self, entry: CallLogEntry) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.call_logs.len() == CALL_LOG_CAPACITY {
            guard.call_logs.pop_back();
        }
        guard.call_logs.push_front(entry);
        Ok(())
    }

    fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.call_logs.iter().take(limit).cloned().collect())
    }

    fn modify<F>(&self, id: &MotherId, change: F) -> Result<MotherRecord, RepositoryError>
    where
        F: FnOnce(&mut MotherRecord),
    {
        let mut guard = self.lock()?;
        let record = guard.records.get_mut(id).ok_or(RepositoryError::NotFound)?;
        change(record);
        Ok(record.clone())
    }
}
