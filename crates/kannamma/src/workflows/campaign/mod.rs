//! Outbound call campaigns: the outcome vocabulary, the sequential run state
//! machine, the async engine driving it, and the telephony seam.

mod engine;
mod provider;
pub mod router;
mod run;
mod single;
mod webhook;

pub use engine::{CampaignEngine, CampaignHandle};
pub use provider::{outcome_for_draw, CallProvider, MockCallProvider};
pub use router::{campaign_router, CampaignState};
pub use run::{CampaignError, CampaignRun, CampaignSnapshot};
pub use single::{
    run_single_call, MenuKey, SingleCallError, SingleCallSession, SingleCallState,
    DEFAULT_PROMPT_DELAY,
};
pub use webhook::{IvrCallback, WebhookCallProvider, WebhookDelivery};

use serde::{Deserialize, Serialize};

use super::mothers::domain::{MotherId, MotherRecord, PhoneType};

/// Terminal result of one placed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallOutcome {
    Answered,
    NoAnswer,
    /// The mother pressed the help option on the IVR menu.
    AlertAcknowledged,
}

impl CallOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Answered => "Answered",
            CallOutcome::NoAnswer => "No Answer",
            CallOutcome::AlertAcknowledged => "Not Taken",
        }
    }

    /// Whether the outcome puts the mother on the ASHA follow-up list.
    pub fn requires_follow_up(&self) -> bool {
        match self {
            CallOutcome::AlertAcknowledged => true,
            CallOutcome::Answered | CallOutcome::NoAnswer => false,
        }
    }
}

/// Lifecycle of a single call attempt within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "outcome")]
pub enum CallStatus {
    Pending,
    InProgress,
    Completed(CallOutcome),
}

impl CallStatus {
    pub fn outcome(&self) -> Option<CallOutcome> {
        match self {
            CallStatus::Completed(outcome) => Some(*outcome),
            CallStatus::Pending | CallStatus::InProgress => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Pending => "Pending",
            CallStatus::InProgress => "Calling...",
            CallStatus::Completed(outcome) => outcome.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAttempt {
    pub target: MotherId,
    pub status: CallStatus,
}

/// Read-only contact snapshot handed to the engine for the run's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    pub mother_id: MotherId,
    pub name: String,
    pub phone: String,
    pub phone_type: PhoneType,
}

impl From<&MotherRecord> for CallTarget {
    fn from(record: &MotherRecord) -> Self {
        Self {
            mother_id: record.id.clone(),
            name: record.name.clone(),
            phone: record.contact.phone.clone(),
            phone_type: record.contact.phone_type,
        }
    }
}

/// Per-target outcomes in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap {
    entries: Vec<ResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub mother_id: MotherId,
    pub outcome: CallOutcome,
}

impl ResultMap {
    /// Record an outcome; a repeated id keeps its first position and takes the new outcome.
    pub fn insert(&mut self, mother_id: MotherId, outcome: CallOutcome) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.mother_id == mother_id)
        {
            Some(entry) => entry.outcome = outcome,
            None => self.entries.push(ResultEntry { mother_id, outcome }),
        }
    }

    pub fn get(&self, mother_id: &MotherId) -> Option<CallOutcome> {
        self.entries
            .iter()
            .find(|entry| &entry.mother_id == mother_id)
            .map(|entry| entry.outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.iter()
    }

    pub fn summary(&self) -> CampaignSummary {
        let mut summary = CampaignSummary::default();
        for entry in &self.entries {
            match entry.outcome {
                CallOutcome::Answered => summary.answered += 1,
                CallOutcome::NoAnswer => summary.no_answer += 1,
                CallOutcome::AlertAcknowledged => summary.alert_acknowledged += 1,
            }
        }
        summary
    }
}

/// Tally shown once a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub answered: usize,
    pub no_answer: usize,
    pub alert_acknowledged: usize,
}

impl CampaignSummary {
    pub fn total(&self) -> usize {
        self.answered + self.no_answer + self.alert_acknowledged
    }
}
