use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CallOutcome, CallTarget};

/// Time the mother hears the greeting before the menu is offered.
pub const DEFAULT_PROMPT_DELAY: Duration = Duration::from_secs(2);

/// IVR menu option pressed during a one-off call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuKey {
    /// "Yes, I have taken my iron tablets."
    #[serde(rename = "1")]
    One,
    /// "No" / needs help from the ASHA worker.
    #[serde(rename = "2")]
    Two,
}

impl MenuKey {
    pub fn outcome(self) -> CallOutcome {
        match self {
            MenuKey::One => CallOutcome::Answered,
            MenuKey::Two => CallOutcome::AlertAcknowledged,
        }
    }
}

impl FromStr for MenuKey {
    type Err = SingleCallError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1" => Ok(MenuKey::One),
            "2" => Ok(MenuKey::Two),
            other => Err(SingleCallError::UnknownKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "outcome")]
pub enum SingleCallState {
    Idle,
    Dialing,
    AwaitingResponse,
    Completed(CallOutcome),
}

impl SingleCallState {
    fn name(&self) -> &'static str {
        match self {
            SingleCallState::Idle => "idle",
            SingleCallState::Dialing => "dialing",
            SingleCallState::AwaitingResponse => "awaiting-response",
            SingleCallState::Completed(_) => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SingleCallError {
    #[error("cannot {action} while the call is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("menu option '{0}' is not offered; press 1 or 2")]
    UnknownKey(String),
}

/// One health-worker initiated call, resolved by the mother's menu response.
#[derive(Debug, Clone)]
pub struct SingleCallSession {
    target: CallTarget,
    state: SingleCallState,
}

impl SingleCallSession {
    pub fn new(target: CallTarget) -> Self {
        Self {
            target,
            state: SingleCallState::Idle,
        }
    }

    pub fn target(&self) -> &CallTarget {
        &self.target
    }

    pub fn state(&self) -> SingleCallState {
        self.state
    }

    pub fn start(&mut self) -> Result<(), SingleCallError> {
        self.transition(SingleCallState::Idle, SingleCallState::Dialing, "start")
    }

    pub fn prompt_ready(&mut self) -> Result<(), SingleCallError> {
        self.transition(
            SingleCallState::Dialing,
            SingleCallState::AwaitingResponse,
            "offer the menu",
        )
    }

    pub fn respond(&mut self, key: MenuKey) -> Result<CallOutcome, SingleCallError> {
        let outcome = key.outcome();
        self.transition(
            SingleCallState::AwaitingResponse,
            SingleCallState::Completed(outcome),
            "accept a response",
        )?;
        Ok(outcome)
    }

    fn transition(
        &mut self,
        expected: SingleCallState,
        next: SingleCallState,
        action: &'static str,
    ) -> Result<(), SingleCallError> {
        if self.state != expected {
            return Err(SingleCallError::InvalidTransition {
                state: self.state.name(),
                action,
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Dial, wait for the menu prompt, then resolve with whatever key `response` yields.
pub async fn run_single_call<F>(
    target: CallTarget,
    prompt_delay: Duration,
    response: F,
) -> Result<CallOutcome, SingleCallError>
where
    F: Future<Output = MenuKey>,
{
    let mut session = SingleCallSession::new(target);
    session.start()?;
    tokio::time::sleep(prompt_delay).await;
    session.prompt_ready()?;
    let key = response.await;
    session.respond(key)
}
