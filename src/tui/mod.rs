//! Terminal front-end: a ratatui window with three screens (writing, writings list, a single
//! writing), driven by crossterm key events and by the session's decay monitor.
//!
//! The event loop owns the [app::App]. Key presses are translated by [input] into
//! [app::Command]s, monitor messages arrive over a channel, and after either the whole window is
//! redrawn by [render].

pub mod app;
pub mod input;
pub mod render;
pub mod wrap;

use std::{
    io::{self, Stdout},
    sync::Arc,
};

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{
    session::{monitor::SessionEvent, SharedSession},
    storage::writing_storage::WritingStorage,
    utils::clock::Clock,
};

use app::{App, Command};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Takes over the terminal until the user quits.
pub async fn run_tui<S: WritingStorage>(storage: Arc<S>, clock: Arc<dyn Clock>) -> Result<()> {
    let mut terminal = setup_terminal()?;

    let (sender, receiver) = mpsc::channel::<SessionEvent>(16);
    let app = App::new(SharedSession::default(), storage, clock, sender);

    let result = event_loop(&mut terminal, app, receiver).await;

    restore_terminal(&mut terminal).inspect_err(|e| error!("Failed to restore terminal {e:?}"))?;
    result
}

async fn event_loop<S: WritingStorage>(
    terminal: &mut CrosstermTerminal,
    mut app: App<S>,
    mut receiver: mpsc::Receiver<SessionEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    info!("Terminal ui started");

    while !app.should_quit() {
        let completed = terminal.draw(|frame| render::render(frame, &app))?;
        app.set_frame_area(completed.area);

        let command = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app.screen(), key)
                }
                Some(Ok(Event::Paste(text))) => input::handle_paste(app.screen(), text),
                // Resizes and the rest only need a redraw.
                Some(Ok(_)) => Command::None,
                Some(Err(e)) => return Err(e.into()),
                None => Command::Quit,
            },
            Some(event) = receiver.recv() => {
                app.apply_session_event(event);
                Command::None
            }
        };

        app.execute(command).await;
    }

    info!("Terminal ui stopped");
    Ok(())
}

fn setup_terminal() -> Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        SetTitle("anky")
    )?;

    // Leave the terminal usable if anything panics while the ui is up.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut CrosstermTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
