//! assessly-runner: drives an assessment session in real time.
//!
//! Spawns a single task that owns the session, serializes user commands with
//! countdown ticks, and publishes a snapshot after every change.

mod driver;
pub mod error;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use assessly_core::session::{AssessmentSession, Phase, SessionSnapshot};
use assessly_core::time::Countdown;

pub use driver::Command;
pub use error::RunnerError;

use driver::{Driver, Request};

/// Hooks for rendering session changes as they happen.
///
/// Called from the driver task, so implementations should not block.
pub trait SessionObserver: Send + Sync {
    /// A command was accepted.
    fn on_change(&self, session: &AssessmentSession);
    /// One second came off the clock.
    fn on_tick(&self, session: &AssessmentSession);
    /// The session just reached `Completed`. Called once.
    fn on_complete(&self, session: &AssessmentSession);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_change(&self, _: &AssessmentSession) {}
    fn on_tick(&self, _: &AssessmentSession) {}
    fn on_complete(&self, _: &AssessmentSession) {}
}

/// Configures and spawns a session driver.
pub struct SessionRunner {
    session: AssessmentSession,
    observer: Arc<dyn SessionObserver>,
    countdown: Countdown,
    queue_depth: usize,
}

impl SessionRunner {
    pub fn new(session: AssessmentSession) -> Self {
        Self {
            session,
            observer: Arc::new(NoopObserver),
            countdown: Countdown::default(),
            queue_depth: 16,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the tick period. Only useful in tests and demos.
    pub fn with_countdown(mut self, countdown: Countdown) -> Self {
        self.countdown = countdown;
        self
    }

    /// Spawn the driver on the current tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (requests_tx, requests_rx) = mpsc::channel(self.queue_depth.max(1));
        let (snapshots_tx, snapshots_rx) = watch::channel(self.session.snapshot());

        let driver = Driver {
            session: self.session,
            countdown: self.countdown,
            requests: requests_rx,
            snapshots: snapshots_tx,
            observer: self.observer,
        };

        SessionHandle {
            requests: requests_tx,
            snapshots: snapshots_rx,
            task: tokio::spawn(driver.run()),
        }
    }
}

/// Handle to a running session.
///
/// Dropping the handle (or calling `finish`) stops the driver; the countdown
/// stops with it.
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<AssessmentSession>,
}

impl SessionHandle {
    /// Send a command and wait for the session's answer.
    pub async fn send(&self, command: Command) -> Result<SessionSnapshot, RunnerError> {
        let (reply, outcome) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| RunnerError::Stopped)?;
        Ok(outcome.await.map_err(|_| RunnerError::Stopped)??)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the session reaches `Completed`, whatever the cause.
    pub async fn completed(&mut self) -> Result<SessionSnapshot, RunnerError> {
        let snapshot = self
            .snapshots
            .wait_for(|s| s.phase == Phase::Completed)
            .await
            .map_err(|_| RunnerError::Stopped)?;
        Ok(snapshot.clone())
    }

    /// Stop the driver and take the session back.
    pub async fn finish(self) -> Result<AssessmentSession, RunnerError> {
        drop(self.requests);
        self.task.await.map_err(|e| {
            tracing::error!("session driver failed: {e}");
            RunnerError::Stopped
        })
    }
}
