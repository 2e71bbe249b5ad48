use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::provider::CallProvider;
use super::run::{CampaignRun, CampaignSnapshot};
use super::{CallTarget, ResultMap};

/// Drives campaign runs against a call provider, one target at a time.
#[derive(Clone)]
pub struct CampaignEngine {
    provider: Arc<dyn CallProvider>,
}

impl CampaignEngine {
    pub fn new(provider: Arc<dyn CallProvider>) -> Self {
        Self { provider }
    }

    /// Start a run over `targets` in the given order.
    ///
    /// An empty list completes before this returns and spawns nothing.
    /// Otherwise a tokio task is spawned, so this must be called from
    /// within a runtime.
    pub fn start(&self, targets: Vec<CallTarget>) -> CampaignHandle {
        let run = CampaignRun::new(targets);
        let (progress_tx, progress_rx) = watch::channel(run.snapshot());
        let (done_tx, done_rx) = oneshot::channel();

        if run.is_empty() {
            let _ = done_tx.send(ResultMap::default());
            return CampaignHandle {
                progress: progress_rx,
                completion: Some(done_rx),
                task: None,
            };
        }

        info!(targets = run.len(), "campaign run started");
        let provider = self.provider.clone();
        let task = tokio::spawn(drive(provider, run, progress_tx, done_tx));

        CampaignHandle {
            progress: progress_rx,
            completion: Some(done_rx),
            task: Some(task),
        }
    }
}

async fn drive(
    provider: Arc<dyn CallProvider>,
    mut run: CampaignRun,
    progress: watch::Sender<CampaignSnapshot>,
    done: oneshot::Sender<ResultMap>,
) {
    loop {
        let target = match run.begin_next() {
            Ok(Some(target)) => target.clone(),
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "campaign run stalled");
                break;
            }
        };
        progress.send_replace(run.snapshot());

        let outcome = provider.place_call(&target).await;
        if let Err(err) = run.resolve(outcome) {
            warn!(error = %err, "campaign run stalled");
            break;
        }
        debug!(
            mother_id = %target.mother_id,
            outcome = outcome.label(),
            cursor = run.cursor(),
            "call resolved"
        );
        progress.send_replace(run.snapshot());
    }

    let results = run.results();
    let summary = results.summary();
    info!(
        answered = summary.answered,
        no_answer = summary.no_answer,
        alert_acknowledged = summary.alert_acknowledged,
        "campaign run complete"
    );

    if done.send(results).is_err() {
        debug!("campaign handle dropped before completion was read");
    }
}

/// Caller-side handle for a running campaign.
///
/// Dropping the handle (or calling [`CampaignHandle::cancel`]) aborts the
/// run: the pending call is abandoned and no completion is delivered.
pub struct CampaignHandle {
    progress: watch::Receiver<CampaignSnapshot>,
    completion: Option<oneshot::Receiver<ResultMap>>,
    task: Option<JoinHandle<()>>,
}

impl CampaignHandle {
    pub fn snapshot(&self) -> CampaignSnapshot {
        self.progress.borrow().clone()
    }

    /// Subscribe to snapshots published after every transition.
    pub fn progress(&self) -> watch::Receiver<CampaignSnapshot> {
        self.progress.clone()
    }

    /// Wait for the run to finish; `None` when it was aborted.
    pub async fn wait(mut self) -> Option<ResultMap> {
        let completion = self.completion.take()?;
        let results = completion.await.ok()?;
        if let Some(task) = self.task.take() {
            // Completion is the task's final step; joining only reaps it.
            let _ = task.await;
        }
        Some(results)
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CampaignHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                warn!("campaign run cancelled before completion");
                task.abort();
            }
        }
    }
}
