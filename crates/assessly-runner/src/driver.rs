//! The driver task.
//!
//! One task owns the session. User commands arrive over a channel and timer
//! ticks come from the countdown deadline, and both are handled in the same
//! `select!` loop, so transitions are strictly serialized. The countdown only
//! has a deadline while the session is active; every other phase clears it
//! before the next loop iteration, so a tick can never land on a paused,
//! completed or torn-down session.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use assessly_core::session::{AssessmentSession, Phase, SessionSnapshot, TickOutcome};
use assessly_core::time::Countdown;
use assessly_core::AssessmentError;

use crate::SessionObserver;

/// A user action forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Select(usize),
    Advance,
    Pause,
    Resume,
    Complete,
}

/// A command plus the channel its outcome is reported on.
pub(crate) struct Request {
    pub command: Command,
    pub reply: oneshot::Sender<Result<SessionSnapshot, AssessmentError>>,
}

pub(crate) struct Driver {
    pub session: AssessmentSession,
    pub countdown: Countdown,
    pub requests: mpsc::Receiver<Request>,
    pub snapshots: watch::Sender<SessionSnapshot>,
    pub observer: Arc<dyn SessionObserver>,
}

impl Driver {
    /// Run until every handle is dropped, then hand the session back.
    pub async fn run(mut self) -> AssessmentSession {
        self.sync_countdown();

        loop {
            let deadline = self.countdown.deadline();
            let tick = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                request = self.requests.recv() => {
                    let Some(request) = request else { break };
                    self.handle(request);
                }
                () = tick => {
                    self.countdown.fired();
                    self.handle_tick();
                }
            }
        }

        self.countdown.cancel();
        tracing::debug!(phase = %self.session.phase(), "session driver stopped");
        self.session
    }

    fn handle(&mut self, request: Request) {
        let before = self.session.phase();
        let outcome = apply(&mut self.session, request.command);
        self.sync_countdown();

        let outcome = match outcome {
            Ok(()) => {
                let snapshot = self.publish();
                self.observer.on_change(&self.session);
                if before != Phase::Completed && self.session.phase() == Phase::Completed {
                    self.observer.on_complete(&self.session);
                }
                Ok(snapshot)
            }
            Err(e) => {
                tracing::debug!(command = ?request.command, error = %e, "command rejected");
                Err(e)
            }
        };

        // the caller may have stopped waiting; the transition still happened
        let _ = request.reply.send(outcome);
    }

    fn handle_tick(&mut self) {
        match self.session.tick() {
            TickOutcome::Ignored => {}
            TickOutcome::Counted { .. } => {
                self.publish();
                self.observer.on_tick(&self.session);
            }
            TickOutcome::Expired => {
                tracing::info!("time expired");
                self.publish();
                self.observer.on_tick(&self.session);
                self.observer.on_complete(&self.session);
            }
        }
        self.sync_countdown();
    }

    fn sync_countdown(&mut self) {
        let now = Instant::now();
        match self.session.phase() {
            Phase::Active => self.countdown.arm(now),
            Phase::Paused => self.countdown.disarm(now),
            Phase::Idle | Phase::Completed => self.countdown.cancel(),
        }
    }

    fn publish(&self) -> SessionSnapshot {
        let snapshot = self.session.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

fn apply(session: &mut AssessmentSession, command: Command) -> Result<(), AssessmentError> {
    match command {
        Command::Start => session.start(),
        Command::Select(option) => session.select_answer(option),
        Command::Advance => session.advance().map(|_| ()),
        Command::Pause => session.pause(),
        Command::Resume => session.resume(),
        Command::Complete => session.complete().map(|_| ()),
    }
}
