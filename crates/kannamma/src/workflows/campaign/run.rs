use serde::Serialize;

use super::{CallAttempt, CallOutcome, CallStatus, CallTarget, ResultMap};

/// Sequential call state machine over an ordered target list.
///
/// The cursor only advances on `resolve`, so at most one attempt is ever
/// in progress and resolution order matches target order.
#[derive(Debug, Clone)]
pub struct CampaignRun {
    targets: Vec<CallTarget>,
    attempts: Vec<CallAttempt>,
    cursor: usize,
}

/// Point-in-time view published to observers after each transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignSnapshot {
    pub cursor: usize,
    pub total: usize,
    pub attempts: Vec<CallAttempt>,
    pub complete: bool,
}

impl CampaignSnapshot {
    pub fn in_progress(&self) -> impl Iterator<Item = &CallAttempt> {
        self.attempts
            .iter()
            .filter(|attempt| attempt.status == CallStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampaignError {
    #[error("call to {0} is still in progress")]
    CallAlreadyInProgress(String),
    #[error("no call is in progress")]
    NoCallInProgress,
}

impl CampaignRun {
    pub fn new(targets: Vec<CallTarget>) -> Self {
        let attempts = targets
            .iter()
            .map(|target| CallAttempt {
                target: target.mother_id.clone(),
                status: CallStatus::Pending,
            })
            .collect();

        Self {
            targets,
            attempts,
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.targets.len()
    }

    pub fn attempts(&self) -> &[CallAttempt] {
        &self.attempts
    }

    /// Move the attempt under the cursor from pending to in progress.
    ///
    /// Returns `Ok(None)` once every target has been called.
    pub fn begin_next(&mut self) -> Result<Option<&CallTarget>, CampaignError> {
        let Some(attempt) = self.attempts.get_mut(self.cursor) else {
            return Ok(None);
        };

        match attempt.status {
            CallStatus::Pending => {
                attempt.status = CallStatus::InProgress;
                Ok(self.targets.get(self.cursor))
            }
            CallStatus::InProgress => Err(CampaignError::CallAlreadyInProgress(
                attempt.target.to_string(),
            )),
            // The cursor moves past an attempt in the same step that completes it.
            CallStatus::Completed(_) => Ok(None),
        }
    }

    /// Settle the in-progress attempt and advance the cursor.
    pub fn resolve(&mut self, outcome: CallOutcome) -> Result<&CallAttempt, CampaignError> {
        let index = self.cursor;
        let attempt = self
            .attempts
            .get_mut(index)
            .filter(|attempt| attempt.status == CallStatus::InProgress)
            .ok_or(CampaignError::NoCallInProgress)?;

        attempt.status = CallStatus::Completed(outcome);
        self.cursor += 1;
        Ok(&self.attempts[index])
    }

    /// Terminal outcomes only; attempts that never resolved are left out.
    pub fn results(&self) -> ResultMap {
        let mut results = ResultMap::default();
        for attempt in &self.attempts {
            if let Some(outcome) = attempt.status.outcome() {
                results.insert(attempt.target.clone(), outcome);
            }
        }
        results
    }

    pub fn snapshot(&self) -> CampaignSnapshot {
        CampaignSnapshot {
            cursor: self.cursor,
            total: self.targets.len(),
            attempts: self.attempts.clone(),
            complete: self.is_complete(),
        }
    }
}
