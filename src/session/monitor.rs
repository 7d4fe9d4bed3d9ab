use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    storage::{entities::Writing, writing_storage::WritingStorage},
    utils::clock::Clock,
};

use super::{decay::DecayEvaluator, SharedSession, TickOutcome};

pub const DEFAULT_TICK_FREQUENCY: Duration = Duration::from_secs(1);

/// Messages from the monitor to the ui.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The life bar changed, redraw.
    Refresh,
    /// The session ran out of time and its text was committed.
    Committed(Writing),
}

/// Periodic task that drains the life bar of one session and commits its text once the bar is
/// empty. One monitor exists per session at most; it stops after committing or as soon as its
/// session is reset.
pub struct DecayMonitor<S> {
    session: SharedSession,
    storage: Arc<S>,
    next: mpsc::Sender<SessionEvent>,
    timer: CancellationToken,
    evaluator: DecayEvaluator,
    tick_frequency: Duration,
    time_provider: Arc<dyn Clock>,
}

impl<S: WritingStorage> DecayMonitor<S> {
    pub fn new(
        session: SharedSession,
        storage: Arc<S>,
        next: mpsc::Sender<SessionEvent>,
        timer: CancellationToken,
        evaluator: DecayEvaluator,
        tick_frequency: Duration,
        time_provider: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session,
            storage,
            next,
            timer,
            evaluator,
            tick_frequency,
            time_provider,
        }
    }

    /// Executes the monitor loop.
    pub async fn run(self) -> Result<()> {
        let mut tick_point = self.time_provider.instant();
        loop {
            tick_point += self.tick_frequency;

            tokio::select! {
                _ = self.timer.cancelled() => {
                    debug!("Session was reset, stopping the monitor");
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(tick_point) => ()
            }

            // The guard is a temporary, the lock is released before anything is sent.
            let outcome = self.session.lock().tick(
                &self.timer,
                &self.evaluator,
                self.time_provider.instant(),
            );

            match outcome {
                TickOutcome::Alive(bar) => {
                    debug!("Current percentage: {}", bar.percentage);
                    self.notify(SessionEvent::Refresh).await?;
                }
                TickOutcome::Expired(text) => {
                    let span = info_span!("Committing writing");
                    let writing = self.commit(text).instrument(span).await;
                    return self.notify(SessionEvent::Committed(writing)).await;
                }
                TickOutcome::Cancelled => return Ok(()),
            }
        }
    }

    async fn commit(&self, text: String) -> Writing {
        match self.storage.save(&text).await {
            Ok(writing) => {
                info!(
                    "Committed writing {:?} at {}",
                    writing.path,
                    self.time_provider.time()
                );
                writing
            }
            Err(e) => {
                // The user still gets to see the text, it just isn't on disk.
                error!("Failed to save the writing {e:?}");
                Writing::unsaved(text)
            }
        }
    }

    async fn notify(&self, event: SessionEvent) -> Result<()> {
        self.next
            .send(event)
            .await
            .inspect_err(|e| error!("Ui stopped listening to the session {e:?}"))?;
        Ok(())
    }
}
