use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::provider::CallProvider;
use super::{CallOutcome, CallTarget};
use crate::config::CampaignConfig;
use crate::workflows::mothers::domain::{mask_phone, normalize_phone};

/// Status callback posted by the IVR provider (Twilio and Exotel field names accepted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvrCallback {
    #[serde(default, alias = "CallSid", alias = "CallId")]
    pub call_sid: Option<String>,
    #[serde(alias = "From", alias = "CallerNumber")]
    pub phone: String,
    #[serde(alias = "CallStatus", alias = "Status")]
    pub call_status: String,
    #[serde(default, alias = "Digits", alias = "DtmfDigits")]
    pub digits: Option<String>,
    #[serde(default, alias = "CallDuration")]
    pub call_duration: Option<u32>,
}

impl IvrCallback {
    /// Terminal outcome carried by this callback, if any.
    ///
    /// Ringing and initiation events, and unrecognised menu digits, do not
    /// settle the call.
    pub fn outcome(&self) -> Option<CallOutcome> {
        match self.call_status.trim().to_ascii_lowercase().as_str() {
            "in-progress" => match self.digits.as_deref().map(str::trim) {
                Some("2") => Some(CallOutcome::AlertAcknowledged),
                Some("1") | Some("3") => Some(CallOutcome::Answered),
                _ => None,
            },
            "completed" | "ended" => {
                if self.call_duration.unwrap_or(0) > 0 {
                    Some(CallOutcome::Answered)
                } else {
                    Some(CallOutcome::NoAnswer)
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "delivery", content = "outcome")]
pub enum WebhookDelivery {
    Resolved(CallOutcome),
    Ignored,
    NoPendingCall,
}

/// Provider that waits for the IVR webhook to report what happened on the call.
///
/// Calls are keyed by normalised phone number. A call with no settling
/// callback within the answer timeout resolves as `NoAnswer`.
#[derive(Debug)]
pub struct WebhookCallProvider {
    pending: Mutex<HashMap<String, oneshot::Sender<CallOutcome>>>,
    answer_timeout: Duration,
}

impl WebhookCallProvider {
    pub fn new(answer_timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            answer_timeout,
        }
    }

    pub fn from_config(config: &CampaignConfig) -> Self {
        Self::new(config.answer_timeout)
    }

    pub fn pending_calls(&self) -> usize {
        self.pending().values().filter(|sender| !sender.is_closed()).count()
    }

    /// Route a provider callback to the call waiting on that number.
    pub fn deliver(&self, callback: &IvrCallback) -> WebhookDelivery {
        let Some(outcome) = callback.outcome() else {
            return WebhookDelivery::Ignored;
        };

        let key = normalize_phone(&callback.phone);
        let sender = self.pending().remove(&key);
        let delivered = match sender {
            Some(sender) => sender.send(outcome).is_ok(),
            None => false,
        };

        if delivered {
            return WebhookDelivery::Resolved(outcome);
        }

        warn!(
            phone = %mask_phone(&key),
            call_sid = callback.call_sid.as_deref().unwrap_or("-"),
            "IVR callback arrived with no call waiting"
        );
        WebhookDelivery::NoPendingCall
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<CallOutcome>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CallProvider for WebhookCallProvider {
    async fn place_call(&self, target: &CallTarget) -> CallOutcome {
        let key = normalize_phone(&target.phone);
        let (sender, receiver) = oneshot::channel();
        {
            let mut pending = self.pending();
            pending.retain(|_, waiting| !waiting.is_closed());
            pending.insert(key.clone(), sender);
        }

        info!(
            mother_id = %target.mother_id,
            phone = %mask_phone(&key),
            "awaiting IVR callback"
        );

        match tokio::time::timeout(self.answer_timeout, receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                warn!(mother_id = %target.mother_id, "pending call superseded before callback");
                CallOutcome::NoAnswer
            }
            Err(_) => {
                self.pending().retain(|_, waiting| !waiting.is_closed());
                warn!(
                    mother_id = %target.mother_id,
                    timeout_secs = self.answer_timeout.as_secs(),
                    "no IVR callback before answer timeout"
                );
                CallOutcome::NoAnswer
            }
        }
    }
}
