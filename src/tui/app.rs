use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    session::{
        buffer::Edit,
        decay::DecayEvaluator,
        monitor::{DecayMonitor, SessionEvent, DEFAULT_TICK_FREQUENCY},
        KeystrokeOutcome, SharedSession,
    },
    storage::{
        entities::{Writing, WritingSummary},
        writing_storage::WritingStorage,
    },
    utils::clock::Clock,
};

use super::render::{detail_area, detail_scroll_limit};

/// Which screen currently fills the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Writing,
    List {
        writings: Vec<WritingSummary>,
        selected: usize,
    },
    Detail {
        writing: Writing,
        scroll: u16,
    },
}

/// Everything a key press can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(Edit),
    OpenList,
    SelectPrevious,
    SelectNext,
    OpenSelected,
    ScrollUp(u16),
    ScrollDown(u16),
    /// Back and Write Again. Both reset the session.
    BackToWriting,
    Quit,
    None,
}

/// Model of the terminal ui. Owns the current screen; the text being written lives in the
/// shared session so the monitor can commit it.
pub struct App<S> {
    screen: Screen,
    should_quit: bool,
    /// Text area of the read-only view as of the last draw.
    detail_area: Rect,
    session: SharedSession,
    storage: Arc<S>,
    time_provider: Arc<dyn Clock>,
    events: mpsc::Sender<SessionEvent>,
}

impl<S: WritingStorage> App<S> {
    pub fn new(
        session: SharedSession,
        storage: Arc<S>,
        time_provider: Arc<dyn Clock>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            screen: Screen::Writing,
            should_quit: false,
            detail_area: Rect::default(),
            session,
            storage,
            time_provider,
            events,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Scrolling is bounded by the wrapped text, so the app has to know the window size.
    pub fn set_frame_area(&mut self, area: Rect) {
        self.detail_area = detail_area(area);
    }

    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::Edit(edit) => self.edit(edit),
            Command::OpenList => self.open_list().await,
            Command::SelectPrevious => {
                if let Screen::List { selected, .. } = &mut self.screen {
                    *selected = selected.saturating_sub(1);
                }
            }
            Command::SelectNext => {
                if let Screen::List { writings, selected } = &mut self.screen {
                    if *selected + 1 < writings.len() {
                        *selected += 1;
                    }
                }
            }
            Command::OpenSelected => self.open_selected().await,
            Command::ScrollUp(rows) => {
                if let Screen::Detail { scroll, .. } = &mut self.screen {
                    *scroll = scroll.saturating_sub(rows);
                }
            }
            Command::ScrollDown(rows) => {
                if let Screen::Detail { writing, scroll } = &mut self.screen {
                    let limit = detail_scroll_limit(&writing.content, self.detail_area);
                    *scroll = scroll.saturating_add(rows).min(limit);
                }
            }
            Command::BackToWriting => self.back_to_writing(),
            Command::Quit => self.should_quit = true,
            Command::None => {}
        }
    }

    pub fn apply_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Refresh => {}
            SessionEvent::Committed(writing) => {
                info!("Showing committed writing {:?}", writing.id);
                self.screen = Screen::Detail { writing, scroll: 0 };
            }
        }
    }

    fn edit(&mut self, edit: Edit) {
        if self.screen != Screen::Writing {
            return;
        }
        let now = self.time_provider.instant();
        let outcome = self.session.lock().apply(edit, now);
        if let KeystrokeOutcome::StartTimer(timer) = outcome {
            self.spawn_monitor(timer);
        }
    }

    fn spawn_monitor(&self, timer: CancellationToken) {
        let monitor = DecayMonitor::new(
            self.session.clone(),
            self.storage.clone(),
            self.events.clone(),
            timer,
            DecayEvaluator::default(),
            DEFAULT_TICK_FREQUENCY,
            self.time_provider.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = monitor.run().await {
                error!("Decay monitor stopped with an error {e:?}");
            }
        });
    }

    async fn open_list(&mut self) {
        match self.storage.list().await {
            Ok(writings) => {
                self.screen = Screen::List {
                    writings,
                    selected: 0,
                }
            }
            Err(e) => error!("Failed to list writings {e:?}"),
        }
    }

    async fn open_selected(&mut self) {
        let Screen::List { writings, selected } = &self.screen else {
            return;
        };
        let Some((id, path)) = writings.get(*selected).map(|v| (v.id, v.path.clone())) else {
            warn!("Nothing to open, the list is empty");
            return;
        };
        let content = self.storage.read(&path).await;
        match content {
            Ok(content) => {
                let writing = Writing {
                    id: Some(id),
                    path: Some(path),
                    content,
                };
                self.screen = Screen::Detail { writing, scroll: 0 };
            }
            Err(e) => error!("Failed to read writing {path:?} {e:?}"),
        }
    }

    fn back_to_writing(&mut self) {
        self.session.lock().reset();
        self.screen = Screen::Writing;
    }
}
