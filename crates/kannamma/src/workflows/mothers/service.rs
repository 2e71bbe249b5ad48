use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{MotherId, MotherRecord, MotherSubmission, MotherUpdate};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{CallLogEntry, MotherRepository, RepositoryError};
use super::risk::RiskLabel;
use crate::workflows::campaign::{CallOutcome, CallTarget, ResultMap};

/// Registry composing the intake guard and repository; the only writer of mother records.
pub struct MotherRegistryService<R> {
    guard: IntakeGuard,
    repository: Arc<R>,
}

static MOTHER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_mother_id() -> MotherId {
    let id = MOTHER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MotherId(format!("m-{id:06}"))
}

/// What happened when a batch of campaign outcomes was folded into the registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampaignReconciliation {
    pub updated: Vec<MotherRecord>,
    pub skipped: Vec<SkippedUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUpdate {
    pub mother_id: MotherId,
    pub reason: String,
}

/// Records grouped for the dashboard's risk columns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskGroups {
    pub red: Vec<MotherRecord>,
    pub yellow: Vec<MotherRecord>,
    pub green: Vec<MotherRecord>,
}

impl RiskGroups {
    fn push(&mut self, record: MotherRecord) {
        match record.risk_label() {
            RiskLabel::Red => self.red.push(record),
            RiskLabel::Yellow => self.yellow.push(record),
            RiskLabel::Green => self.green.push(record),
        }
    }
}

impl<R> MotherRegistryService<R>
where
    R: MotherRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            guard: IntakeGuard,
            repository,
        }
    }

    /// Register a mother; the initial label assumes no missed calls.
    pub fn create(&self, submission: MotherSubmission) -> Result<MotherRecord, MotherServiceError> {
        let submission = self.guard.accept(submission)?;
        let record = MotherRecord::new(next_mother_id(), submission);
        let stored = self.repository.insert(record)?;
        info!(mother_id = %stored.id, risk = stored.risk_label().label(), "mother registered");
        Ok(stored)
    }

    /// Register a record assembled elsewhere, such as an import or seed data.
    pub fn import(&self, record: MotherRecord) -> Result<MotherRecord, MotherServiceError> {
        Ok(self.repository.insert(record)?)
    }

    pub fn list(&self) -> Result<Vec<MotherRecord>, MotherServiceError> {
        Ok(self.repository.list()?)
    }

    /// Records whose `flagged` state matches, in registration order.
    pub fn flagged(&self, flagged: bool) -> Result<Vec<MotherRecord>, MotherServiceError> {
        let mut records = self.repository.list()?;
        records.retain(|record| record.flagged == flagged);
        Ok(records)
    }

    pub fn get(&self, id: &MotherId) -> Result<MotherRecord, MotherServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn update(&self, id: &MotherId, update: MotherUpdate) -> Result<MotherRecord, MotherServiceError> {
        let update = self.guard.accept_update(update)?;
        self.modify(id, |record| record.apply_update(update))
    }

    pub fn mark_visited(&self, id: &MotherId) -> Result<MotherRecord, MotherServiceError> {
        self.modify(id, MotherRecord::mark_visited)
    }

    pub fn toggle_flag(&self, id: &MotherId) -> Result<MotherRecord, MotherServiceError> {
        self.modify(id, MotherRecord::toggle_flag)
    }

    /// Fold one call outcome into the record and log the call.
    ///
    /// The record is the source of truth; a failed log write is reported but
    /// does not undo the saved outcome.
    pub fn apply_call_outcome(
        &self,
        id: &MotherId,
        outcome: CallOutcome,
    ) -> Result<MotherRecord, MotherServiceError> {
        let record = self.modify(id, |record| record.register_call(outcome))?;
        if let Err(err) = self
            .repository
            .log_call(CallLogEntry::for_record(&record, outcome))
        {
            warn!(mother_id = %id, error = %err, "call log write failed");
        }
        Ok(record)
    }

    /// Apply a completed run's outcomes in result order.
    ///
    /// A record that cannot be updated is reported in `skipped` and does not
    /// stop the remaining entries.
    pub fn apply_campaign_results(&self, results: &ResultMap) -> CampaignReconciliation {
        let mut reconciliation = CampaignReconciliation::default();

        for entry in results.iter() {
            match self.apply_call_outcome(&entry.mother_id, entry.outcome) {
                Ok(record) => reconciliation.updated.push(record),
                Err(err) => {
                    warn!(
                        mother_id = %entry.mother_id,
                        error = %err,
                        "campaign outcome could not be applied"
                    );
                    reconciliation.skipped.push(SkippedUpdate {
                        mother_id: entry.mother_id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        reconciliation
    }

    /// Ordered call targets; every registered mother when `ids` is `None`.
    pub fn campaign_targets(
        &self,
        ids: Option<&[MotherId]>,
    ) -> Result<Vec<CallTarget>, MotherServiceError> {
        let Some(ids) = ids else {
            return Ok(self
                .repository
                .list()?
                .iter()
                .map(CallTarget::from)
                .collect());
        };

        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            if targets.iter().any(|target: &CallTarget| &target.mother_id == id) {
                continue;
            }
            match self.repository.fetch(id)? {
                Some(record) => targets.push(CallTarget::from(&record)),
                None => warn!(mother_id = %id, "campaign target not registered"),
            }
        }
        Ok(targets)
    }

    pub fn risk_groups(&self) -> Result<RiskGroups, MotherServiceError> {
        let mut groups = RiskGroups::default();
        for record in self.repository.list()? {
            groups.push(record);
        }
        Ok(groups)
    }

    pub fn call_logs(&self, limit: usize) -> Result<Vec<CallLogEntry>, MotherServiceError> {
        Ok(self.repository.call_logs(limit)?)
    }

    fn modify<F>(&self, id: &MotherId, change: F) -> Result<MotherRecord, MotherServiceError>
    where
        F: FnOnce(&mut MotherRecord),
    {
        Ok(self.repository.modify(id, change)?)
    }
}

/// Error raised by the registry service.
#[derive(Debug, thiserror::Error)]
pub enum MotherServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
