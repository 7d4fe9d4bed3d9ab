//! A session is one attempt at writing: it starts with the first keystroke on an empty writing
//! screen and ends either when the text is committed or when the user goes back to the writing
//! screen. Its state lives behind a single lock shared by the ui and the
//! [monitor::DecayMonitor].

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::utils::percentage::Percentage;
use buffer::{Edit, TextBuffer};
use decay::{DecayEvaluator, DecayStep, LifeBar};

pub mod buffer;
pub mod decay;
pub mod monitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Writing,
    /// The text was handed over for saving. Nothing can be typed until the session is reset.
    Committed,
}

#[derive(Debug, Clone)]
pub enum KeystrokeOutcome {
    /// First change of the session. The caller is expected to start a monitor bound to the
    /// token.
    StartTimer(CancellationToken),
    Continue,
    /// Nothing changed, or the session is read-only.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Alive(LifeBar),
    /// The bar ran out. Carries the text that has to be saved.
    Expired(String),
    /// The monitor belongs to a session that has been reset.
    Cancelled,
}

#[derive(Debug)]
pub struct Session {
    text: TextBuffer,
    timer_started: bool,
    last_keystroke: Option<Instant>,
    bar: LifeBar,
    phase: SessionPhase,
    timer: CancellationToken,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            text: TextBuffer::default(),
            timer_started: false,
            last_keystroke: None,
            bar: LifeBar::FULL,
            phase: SessionPhase::Writing,
            timer: CancellationToken::new(),
        }
    }

    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    pub fn bar(&self) -> LifeBar {
        self.bar
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn timer_started(&self) -> bool {
        self.timer_started
    }

    /// Applies an edit coming from the user. Only edits that change the text count as
    /// keystrokes.
    pub fn apply(&mut self, edit: Edit, now: Instant) -> KeystrokeOutcome {
        if self.phase == SessionPhase::Committed {
            return KeystrokeOutcome::Ignored;
        }
        if self.text.apply(edit) {
            self.record_keystroke(now)
        } else {
            KeystrokeOutcome::Ignored
        }
    }

    /// Restarts the inactivity window and refills the bar.
    pub fn record_keystroke(&mut self, now: Instant) -> KeystrokeOutcome {
        self.last_keystroke = Some(now);
        self.bar = LifeBar::FULL;
        if self.timer_started {
            return KeystrokeOutcome::Continue;
        }
        self.timer_started = true;
        self.timer = CancellationToken::new();
        debug!("First keystroke of the session, starting the timer");
        KeystrokeOutcome::StartTimer(self.timer.clone())
    }

    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.last_keystroke
            .map(|v| now.saturating_duration_since(v))
    }

    /// One step of the decay monitor. Expiry moves the session into
    /// [SessionPhase::Committed], so it is reported at most once.
    pub fn tick(
        &mut self,
        timer: &CancellationToken,
        evaluator: &DecayEvaluator,
        now: Instant,
    ) -> TickOutcome {
        if timer.is_cancelled() || self.phase == SessionPhase::Committed {
            return TickOutcome::Cancelled;
        }
        let Some(elapsed) = self.elapsed(now) else {
            return TickOutcome::Alive(self.bar);
        };
        match evaluator.evaluate(elapsed) {
            DecayStep::Alive(bar) => {
                self.bar = bar;
                TickOutcome::Alive(bar)
            }
            DecayStep::Expired => {
                self.phase = SessionPhase::Committed;
                self.bar = LifeBar {
                    percentage: Percentage::EMPTY,
                    ..self.bar
                };
                TickOutcome::Expired(self.text.as_str().to_string())
            }
        }
    }

    /// Puts the session back to its initial state and stops its monitor.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.text.clear();
        self.timer_started = false;
        self.last_keystroke = None;
        self.bar = LifeBar::FULL;
        self.phase = SessionPhase::Writing;
    }
}

/// The lock around [Session] shared by the ui and the monitor. It is never held across an
/// `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        // A panic while holding the lock leaves plain data behind, still usable.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{
        buffer::Edit,
        decay::{DecayEvaluator, LifeBar},
        KeystrokeOutcome, Session, SessionPhase, TickOutcome,
    };

    #[test]
    fn test_first_keystroke_starts_timer_once() {
        let mut session = Session::new();
        let now = Instant::now();

        assert!(matches!(
            session.apply(Edit::Insert('a'), now),
            KeystrokeOutcome::StartTimer(_)
        ));
        assert!(matches!(
            session.apply(Edit::Insert('b'), now),
            KeystrokeOutcome::Continue
        ));
        assert!(session.timer_started());
        assert_eq!(session.text().as_str(), "ab");
    }

    #[test]
    fn test_cursor_movement_is_not_a_keystroke() {
        let mut session = Session::new();

        assert!(matches!(
            session.apply(Edit::Left, Instant::now()),
            KeystrokeOutcome::Ignored
        ));
        assert!(!session.timer_started());
    }

    #[test]
    fn test_keystroke_refills_bar() {
        let mut session = Session::new();
        let evaluator = DecayEvaluator::from_seconds(8);
        let start = Instant::now();
        let KeystrokeOutcome::StartTimer(timer) = session.apply(Edit::Insert('a'), start) else {
            panic!("timer should start");
        };

        let outcome = session.tick(&timer, &evaluator, start + Duration::from_secs(6));
        assert!(matches!(outcome, TickOutcome::Alive(bar) if *bar.percentage == 25));
        assert_eq!(session.bar().color_index, 5);

        session.apply(Edit::Insert('b'), start + Duration::from_secs(6));
        assert_eq!(session.bar(), LifeBar::FULL);

        let outcome = session.tick(&timer, &evaluator, start + Duration::from_secs(7));
        assert!(matches!(outcome, TickOutcome::Alive(bar) if *bar.percentage == 88));
    }

    #[test]
    fn test_expiry_happens_once() {
        let mut session = Session::new();
        let evaluator = DecayEvaluator::from_seconds(8);
        let start = Instant::now();
        let KeystrokeOutcome::StartTimer(timer) = session.apply(Edit::Insert('x'), start) else {
            panic!("timer should start");
        };

        let expired = session.tick(&timer, &evaluator, start + Duration::from_secs(8));
        assert_eq!(expired, TickOutcome::Expired("x".into()));
        assert_eq!(session.phase(), SessionPhase::Committed);

        let again = session.tick(&timer, &evaluator, start + Duration::from_secs(9));
        assert_eq!(again, TickOutcome::Cancelled);

        // Committed sessions are read-only.
        assert!(matches!(
            session.apply(Edit::Insert('y'), start + Duration::from_secs(9)),
            KeystrokeOutcome::Ignored
        ));
        assert_eq!(session.text().as_str(), "x");
    }

    #[test]
    fn test_reset_cancels_timer_and_clears_state() {
        let mut session = Session::new();
        let evaluator = DecayEvaluator::from_seconds(8);
        let start = Instant::now();
        let KeystrokeOutcome::StartTimer(timer) = session.apply(Edit::Insert('x'), start) else {
            panic!("timer should start");
        };

        session.reset();

        assert!(timer.is_cancelled());
        assert!(session.text().is_empty());
        assert!(!session.timer_started());
        assert_eq!(session.elapsed(start), None);
        assert_eq!(session.bar(), LifeBar::FULL);
        assert_eq!(
            session.tick(&timer, &evaluator, start + Duration::from_secs(20)),
            TickOutcome::Cancelled
        );

        // The next keystroke starts a fresh timer.
        let outcome = session.apply(Edit::Insert('y'), start + Duration::from_secs(21));
        assert!(matches!(outcome, KeystrokeOutcome::StartTimer(t) if !t.is_cancelled()));
    }
}
