use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{DecisionEngine, FeedbackSource};
use crate::error::Error;
use crate::storage::LoopStorage;
use crate::types::{Action, ControllerState, Decision, Feedback, LoopState};

struct Inner {
    control: ControllerState,
    spec_id: String,
    state: Option<LoopState>,
    cancel: CancellationToken,
    done_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            control: ControllerState::Idle,
            spec_id: String::new(),
            state: None,
            cancel: CancellationToken::new(),
            done_tx: None,
            task: None,
        }
    }
}

/// Drives a single [`LoopState`] through iterative convergence, guarded by a
/// mutex over the controller's shared state.
pub struct LoopController {
    inner: Arc<Mutex<Inner>>,
    decision_engine: Arc<dyn DecisionEngine>,
    feedback_source: Arc<dyn FeedbackSource>,
    storage: Arc<dyn LoopStorage>,
}

impl LoopController {
    pub fn new(
        decision_engine: Arc<dyn DecisionEngine>,
        feedback_source: Arc<dyn FeedbackSource>,
        storage: Arc<dyn LoopStorage>,
    ) -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::default())), decision_engine, feedback_source, storage }
    }

    pub async fn start(&self, spec_id: &str, max_iter: u32) -> Result<(), Error> {
        let mut guard = self.inner.lock().await;
        if guard.control == ControllerState::Running {
            return Err(Error::LoopAlreadyRunning);
        }
        self.begin_running(&mut *guard, LoopState::new(spec_id, max_iter));
        Ok(())
    }

    pub async fn resume_from_storage(&self, spec_id: &str) -> Result<(), Error> {
        let existing = self.storage.load(spec_id).await?;
        let state = existing.unwrap_or_else(|| LoopState::new(spec_id, 0));
        let mut guard = self.inner.lock().await;
        if guard.control == ControllerState::Running || guard.control == ControllerState::Paused {
            return Err(Error::LoopAlreadyRunning);
        }
        self.begin_running(&mut *guard, state);
        Ok(())
    }

    fn begin_running(&self, guard: &mut Inner, state: LoopState) {
        let cancel = CancellationToken::new();
        let (done_tx, _done_rx) = watch::channel(false);

        guard.control = ControllerState::Running;
        guard.spec_id = state.spec_id.clone();
        guard.state = Some(state);
        guard.cancel = cancel.clone();
        guard.done_tx = Some(done_tx.clone());

        let inner = Arc::clone(&self.inner);
        let decision_engine = Arc::clone(&self.decision_engine);
        let feedback_source = Arc::clone(&self.feedback_source);
        let storage = Arc::clone(&self.storage);

        guard.task = Some(tokio::spawn(run_background_loop(
            inner,
            decision_engine,
            feedback_source,
            storage,
            cancel,
            done_tx,
        )));
    }

    pub async fn pause(&self) -> Result<(), Error> {
        let mut guard = self.inner.lock().await;
        if guard.control != ControllerState::Running {
            return Err(Error::LoopNotRunning);
        }
        guard.control = ControllerState::Paused;
        guard.cancel.cancel();
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), Error> {
        let mut guard = self.inner.lock().await;
        if guard.control != ControllerState::Paused {
            return Err(Error::LoopNotPaused);
        }
        let state = guard.state.take().unwrap_or_else(|| LoopState::new(guard.spec_id.clone(), 0));
        self.begin_running(&mut *guard, state);
        Ok(())
    }

    pub async fn cancel(&self) -> Result<(), Error> {
        let (cancel, task) = {
            let mut guard = self.inner.lock().await;
            if guard.control != ControllerState::Running {
                return Err(Error::LoopNotRunning);
            }
            guard.control = ControllerState::Terminated;
            (guard.cancel.clone(), guard.task.take())
        };

        cancel.cancel();
        if let Some(task) = task {
            let _ = task.await;
        }

        let spec_id = {
            let mut guard = self.inner.lock().await;
            std::mem::take(&mut guard.spec_id)
        };
        self.storage.delete(&spec_id).await?;

        let mut guard = self.inner.lock().await;
        guard.state = None;
        if let Some(tx) = guard.done_tx.take() {
            let _ = tx.send(true);
        }
        Ok(())
    }

    pub async fn record_feedback(&self, feedback: Feedback) -> Result<Decision, Error> {
        {
            let guard = self.inner.lock().await;
            if guard.control != ControllerState::Running {
                return Err(Error::LoopNotRunning);
            }
        }
        apply_iteration(&self.inner, &self.decision_engine, &self.storage, feedback).await
    }

    pub async fn status(&self) -> (ControllerState, Option<LoopState>) {
        let guard = self.inner.lock().await;
        (guard.control, guard.state.clone())
    }

    /// `None` before the first `Start`; afterward, resolves to `true` once
    /// the loop is no longer running.
    pub async fn done(&self) -> Option<watch::Receiver<bool>> {
        let guard = self.inner.lock().await;
        guard.done_tx.as_ref().map(|tx| tx.subscribe())
    }
}

async fn run_background_loop(
    inner: Arc<Mutex<Inner>>,
    decision_engine: Arc<dyn DecisionEngine>,
    feedback_source: Arc<dyn FeedbackSource>,
    storage: Arc<dyn LoopStorage>,
    cancel: CancellationToken,
    done_tx: watch::Sender<bool>,
) {
    loop {
        {
            let guard = inner.lock().await;
            if guard.control != ControllerState::Running {
                break;
            }
        }

        let feedback = match feedback_source.collect(&cancel).await {
            Ok(fb) => fb,
            Err(_) => {
                let still_running = {
                    let guard = inner.lock().await;
                    guard.control == ControllerState::Running
                };
                if still_running {
                    let mut guard = inner.lock().await;
                    guard.control = ControllerState::Terminated;
                    let spec_id = std::mem::take(&mut guard.spec_id);
                    drop(guard);
                    let _ = storage.delete(&spec_id).await;
                    let _ = done_tx.send(true);
                }
                break;
            }
        };

        match apply_iteration(&inner, &decision_engine, &storage, feedback).await {
            Ok(Decision { action: Action::Continue, .. }) => continue,
            _ => {
                let _ = done_tx.send(true);
                break;
            }
        }
    }
}

async fn apply_iteration(
    inner: &Arc<Mutex<Inner>>,
    decision_engine: &Arc<dyn DecisionEngine>,
    storage: &Arc<dyn LoopStorage>,
    feedback: Feedback,
) -> Result<Decision, crate::error::Error> {
    let mut loop_state = {
        let mut guard = inner.lock().await;
        guard.state.take().unwrap_or_else(|| LoopState::new(guard.spec_id.clone(), 0))
    };

    loop_state.feedback.push(feedback.clone());
    loop_state.iteration += 1;
    loop_state.updated_at = Utc::now();

    let mut decision = decision_engine.decide(&loop_state, &feedback).await;
    if decision.action == Action::Continue && loop_state.iteration >= loop_state.max_iter {
        decision = decision_engine.decide(&loop_state, &feedback).await;
        if decision.action == Action::Continue {
            decision = Decision {
                action: Action::Abort,
                converged: false,
                reason: "max_iter reached without convergence".to_string(),
            };
        }
    }

    match decision.action {
        Action::Converge | Action::Abort => {
            storage.delete(&loop_state.spec_id).await?;
            let mut guard = inner.lock().await;
            guard.control = ControllerState::Terminated;
            guard.state = Some(loop_state);
        }
        Action::RequestReview => {
            storage.save(&loop_state).await?;
            let mut guard = inner.lock().await;
            guard.control = ControllerState::Paused;
            guard.state = Some(loop_state);
        }
        Action::Continue => {
            storage.save(&loop_state).await?;
            let mut guard = inner.lock().await;
            guard.state = Some(loop_state);
        }
    }

    Ok(decision)
}
