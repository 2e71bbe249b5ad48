use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::mothers::domain::{
    ClinicalDetails, ContactDetails, MotherId, MotherProfile, MotherRecord, MotherSubmission,
    PhoneType,
};
use crate::workflows::mothers::repository::{CallLogEntry, MotherRepository, RepositoryError};
use crate::workflows::mothers::{mother_router, MotherRegistryService};

pub(super) fn profile() -> MotherProfile {
    MotherProfile {
        medical_conditions: "None".to_string(),
        age: 26,
        pregnancy_number: 2,
        weight_kg: 55.0,
        previous_complications: String::new(),
    }
}

pub(super) fn submission() -> MotherSubmission {
    MotherSubmission {
        name: "  Anita Kumari ".to_string(),
        profile: profile(),
        contact: ContactDetails {
            phone: "98765 43210".to_string(),
            alternate_contact: None,
            phone_type: PhoneType::Basic,
            family_member_details: Some("Husband: Ravi".to_string()),
            address: Some("Ward 4, Rampur".to_string()),
        },
        clinical: ClinicalDetails::default(),
        notes: String::new(),
    }
}

/// Diabetes, age 36, third pregnancy, prior pre-eclampsia.
pub(super) fn high_risk_submission() -> MotherSubmission {
    let mut submission = submission();
    submission.name = "Lalita Devi".to_string();
    submission.contact.phone = "+91 88888 77777".to_string();
    submission.profile = MotherProfile {
        medical_conditions: "High BP, Diabetes".to_string(),
        age: 36,
        pregnancy_number: 3,
        weight_kg: 78.0,
        previous_complications: "Pre-eclampsia in last pregnancy".to_string(),
    };
    submission
}

pub(super) fn build_service() -> (
    MotherRegistryService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = MotherRegistryService::new(repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<MotherRecord>>>,
    pub(super) logs: Arc<Mutex<VecDeque<CallLogEntry>>>,
}

impl MotherRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn insert(&self, record: MotherRecord) -> Result<MotherRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update(&self, record: MotherRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn log_call(&self, entry: CallLogEntry) -> Result<(), RepositoryError> {
        self.logs
            .lock()
            .expect("log mutex poisoned")
            .push_front(entry);
        Ok(())
    }

    fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError> {
        let guard = self.logs.lock().expect("log mutex poisoned");
        Ok(guard.iter().take(limit).cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl MotherRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _record: MotherRecord) -> Result<MotherRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: MotherRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn log_call(&self, _entry: CallLogEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn call_logs(&self, _limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Gives every record read-only access: inserts conflict and updates vanish.
pub(super) struct ReadOnlyRepository {
    pub(super) inner: MemoryRepository,
}

impl MotherRepository for ReadOnlyRepository {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError> {
        self.inner.list()
    }

    fn insert(&self, _record: MotherRecord) -> Result<MotherRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: MotherRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn log_call(&self, _entry: CallLogEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError> {
        self.inner.call_logs(limit)
    }
}

/// Stores records normally but cannot write the call log.
pub(super) struct LogFailingRepository {
    pub(super) inner: MemoryRepository,
}

impl MotherRepository for LogFailingRepository {
    fn list(&self) -> Result<Vec<MotherRecord>, RepositoryError> {
        self.inner.list()
    }

    fn insert(&self, record: MotherRecord) -> Result<MotherRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: MotherRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &MotherId) -> Result<Option<MotherRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn log_call(&self, _entry: CallLogEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("call log disk full".to_string()))
    }

    fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, RepositoryError> {
        self.inner.call_logs(limit)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn mother_router_with_service(
    service: MotherRegistryService<MemoryRepository>,
) -> axum::Router {
    mother_router(Arc::new(service))
}
