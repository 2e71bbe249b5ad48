use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::{CallOutcome, CallTarget};
use crate::config::CampaignConfig;

/// Telephony seam: place one call and wait for its terminal outcome.
#[async_trait]
pub trait CallProvider: Send + Sync {
    async fn place_call(&self, target: &CallTarget) -> CallOutcome;
}

const ANSWERED_BELOW: f64 = 0.7;
const NO_ANSWER_BELOW: f64 = 0.9;

/// Map a uniform draw in `[0, 1)` onto the simulated outcome distribution.
pub fn outcome_for_draw(draw: f64) -> CallOutcome {
    if draw < ANSWERED_BELOW {
        CallOutcome::Answered
    } else if draw < NO_ANSWER_BELOW {
        CallOutcome::NoAnswer
    } else {
        CallOutcome::AlertAcknowledged
    }
}

/// Simulated provider: rings for a random bounded interval, then draws an outcome.
#[derive(Debug, Clone)]
pub struct MockCallProvider {
    min_delay: Duration,
    max_delay: Duration,
}

impl MockCallProvider {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };
        Self {
            min_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &CampaignConfig) -> Self {
        Self::new(config.min_call_delay, config.max_call_delay)
    }

    /// No ringing delay; used by demos and tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn ring_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if min == max {
            return self.min_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

impl Default for MockCallProvider {
    fn default() -> Self {
        Self::from_config(&CampaignConfig::default())
    }
}

#[async_trait]
impl CallProvider for MockCallProvider {
    async fn place_call(&self, target: &CallTarget) -> CallOutcome {
        let delay = self.ring_delay();
        tokio::time::sleep(delay).await;

        let draw: f64 = rand::rng().random();
        let outcome = outcome_for_draw(draw);
        debug!(
            mother_id = %target.mother_id,
            delay_ms = delay.as_millis() as u64,
            outcome = outcome.label(),
            "simulated call resolved"
        );
        outcome
    }
}
