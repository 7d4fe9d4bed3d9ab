//! Screen layout.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ ANKY ███████████████ life bar ████   75% │
//! │┌ anky ───────────────────────────────────┐│
//! ││ (writing / writings list / writing)     ││
//! │└─────────────────────────────────────────┘│
//! │ hint line                                 │
//! └──────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    session::{buffer::TextBuffer, decay::LifeBar},
    storage::{
        entities::{Writing, WritingSummary},
        writing_storage::WritingStorage,
    },
};

use super::{
    app::{App, Screen},
    wrap::wrap_rows,
};

const PLACEHOLDER: &str = "Write something...";

/// Draw the whole window for the current state of `app`.
pub fn render<S: WritingStorage>(frame: &mut Frame, app: &App<S>) {
    let [bar_area, body, hint_area] = screen_areas(frame.area());

    let session = app.session().lock();
    draw_life_bar(frame, session.bar(), bar_area);

    match app.screen() {
        Screen::Writing => draw_writing(frame, session.text(), body),
        Screen::List { writings, selected } => draw_list(frame, writings, *selected, body),
        Screen::Detail { writing, scroll } => draw_detail(frame, writing, *scroll, body),
    }
    drop(session);

    draw_hint(frame, app.screen(), hint_area);
}

/// Life bar, body and hint line.
fn screen_areas(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area)
}

fn draw_life_bar(frame: &mut Frame, bar: LifeBar, area: Rect) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            " ANKY",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        area,
    );
    frame.render_widget(
        Paragraph::new(format!("{} ", bar.percentage)).alignment(Alignment::Right),
        area,
    );

    let (r, g, b) = bar.color();
    let filled = Rect {
        width: bar.percentage.of(area.width),
        ..area
    };
    frame.buffer_mut().set_style(
        filled,
        Style::default()
            .bg(Color::Rgb(r, g, b))
            .fg(label_color(bar.color_index)),
    );
}

/// Labels stay readable on the light middle of the gradient.
fn label_color(color_index: usize) -> Color {
    match color_index {
        3..=5 => Color::Black,
        _ => Color::White,
    }
}

fn cursor_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

fn draw_writing(frame: &mut Frame, text: &TextBuffer, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" anky ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if text.is_empty() {
        let placeholder = Line::from(vec![
            Span::styled(" ", cursor_style()),
            Span::styled(
                PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]);
        frame.render_widget(Paragraph::new(placeholder), inner);
        return;
    }

    let (lines, cursor_row) = layout_text(text.as_str(), text.cursor(), inner.width as usize);
    // Keep the cursor row on screen.
    let scroll = cursor_row.saturating_sub(inner.height.saturating_sub(1) as usize);
    frame.render_widget(
        Paragraph::new(lines).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        inner,
    );
}

/// Hard wraps `text` into rows of `width` columns and marks the cursor. Returns the rows and
/// the index of the row holding the cursor.
fn layout_text(text: &str, cursor: usize, width: usize) -> (Vec<Line<'static>>, usize) {
    let width = width.max(1);
    let wrapped = wrap_rows(text, width);
    let mut rows = vec![];
    let mut cursor_row = 0;

    for (i, range) in wrapped.iter().enumerate() {
        let segment = &text[range.clone()];
        // A cursor on a row break belongs to the start of the next row.
        let continued = wrapped.get(i + 1).is_some_and(|v| v.start == range.end);
        if !(range.contains(&cursor) || (cursor == range.end && !continued)) {
            rows.push(Line::raw(segment.to_string()));
            continue;
        }

        let (before, rest) = segment.split_at(cursor - range.start);
        let mut after = rest.chars();
        match after.next() {
            Some(under) => {
                cursor_row = rows.len();
                rows.push(Line::from(vec![
                    Span::raw(before.to_string()),
                    Span::styled(under.to_string(), cursor_style()),
                    Span::raw(after.as_str().to_string()),
                ]));
            }
            None if segment.width() < width => {
                cursor_row = rows.len();
                rows.push(Line::from(vec![
                    Span::raw(segment.to_string()),
                    Span::styled(" ", cursor_style()),
                ]));
            }
            // Cursor right after a full row opens a new one.
            None => {
                rows.push(Line::raw(segment.to_string()));
                cursor_row = rows.len();
                rows.push(Line::from(Span::styled(" ", cursor_style())));
            }
        }
    }

    (rows, cursor_row)
}

fn draw_list(frame: &mut Frame, writings: &[WritingSummary], selected: usize, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Writings: ");

    if writings.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No writings yet.",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let items = writings
        .iter()
        .map(|v| {
            let modified = v
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4}  ", v.id), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{modified:<16}  "), Style::default().fg(Color::DarkGray)),
                Span::raw(v.preview.clone()),
            ]))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Where the read-only text goes for a window of `area`.
pub fn detail_area(area: Rect) -> Rect {
    let [_, body, _] = screen_areas(area);
    Block::default().borders(Borders::ALL).inner(body)
}

/// Last useful scroll offset: the final row of `content` sits at the bottom of `area`.
pub fn detail_scroll_limit(content: &str, area: Rect) -> u16 {
    let rows = wrap_rows(content, area.width as usize).len();
    let limit = rows.saturating_sub(area.height.max(1) as usize);
    u16::try_from(limit).unwrap_or(u16::MAX)
}

fn draw_detail(frame: &mut Frame, writing: &Writing, scroll: u16, area: Rect) {
    let title = match writing.id {
        Some(id) => format!(" Writing {id} "),
        None => " Unsaved writing ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = writing.content.as_str();
    let lines = wrap_rows(content, inner.width as usize)
        .into_iter()
        .map(|v| Line::raw(&content[v]))
        .collect::<Vec<_>>();
    // The window may have shrunk since the offset was chosen.
    let scroll = scroll.min(detail_scroll_limit(content, inner));
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

fn draw_hint(frame: &mut Frame, screen: &Screen, area: Rect) {
    let hint = match screen {
        Screen::Writing => " Tab view writings · Esc quit",
        Screen::List { .. } => " ↑/↓ select · Enter open · Esc back",
        Screen::Detail { .. } => " ↑/↓ scroll · b back · w write again",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use ratatui::{backend::TestBackend, buffer::Buffer, style::Color, Terminal};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};

    use crate::{
        session::{
            buffer::Edit,
            decay::{DecayEvaluator, LIFE_COLORS},
            KeystrokeOutcome, SharedSession,
        },
        storage::writing_storage::WritingStorageImpl,
        tui::app::App,
        utils::clock::DefaultClock,
    };

    use super::{layout_text, render};

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    fn screen_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn create_app(session: SharedSession) -> Result<(App<WritingStorageImpl>, tempfile::TempDir)> {
        let dir = tempdir()?;
        let storage = WritingStorageImpl::new(dir.path().to_owned())?;
        let (sender, _) = mpsc::channel(1);
        Ok((
            App::new(session, Arc::new(storage), Arc::new(DefaultClock), sender),
            dir,
        ))
    }

    #[test]
    fn test_layout_text_wraps_and_tracks_cursor() {
        let (lines, cursor_row) = layout_text("abcdef\ngh", 9, 4);
        let rows = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        assert_eq!(rows, vec!["abcd", "ef", "gh "]);
        assert_eq!(cursor_row, 2);

        let (lines, cursor_row) = layout_text("abcd", 4, 4);
        assert_eq!(lines.len(), 2);
        assert_eq!(cursor_row, 1);

        let (_, cursor_row) = layout_text("abcdef\ngh", 1, 4);
        assert_eq!(cursor_row, 0);
    }

    #[test]
    fn test_layout_text_wraps_wide_characters_by_columns() {
        let (lines, cursor_row) = layout_text("日本語", "日本語".len(), 4);
        let rows = lines.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        assert_eq!(rows, vec!["日本", "語 "]);
        assert_eq!(cursor_row, 1);

        // Cursor on the row break shows at the start of the next row.
        let (_, cursor_row) = layout_text("日本語", "日本".len(), 4);
        assert_eq!(cursor_row, 1);
    }

    #[test]
    fn test_layout_text_handles_empty_lines() {
        let (lines, cursor_row) = layout_text("a\n\n", 3, 10);
        assert_eq!(lines.len(), 3);
        assert_eq!(cursor_row, 2);
    }

    #[test]
    fn test_render_empty_writing_screen() -> Result<()> {
        let (app, _dir) = create_app(SharedSession::default())?;
        let mut terminal = Terminal::new(TestBackend::new(40, 8))?;

        terminal.draw(|frame| render(frame, &app))?;

        let buffer = terminal.backend().buffer();
        let top = row_text(buffer, 0);
        assert!(top.starts_with(" ANKY"));
        assert!(top.trim_end().ends_with("100%"));
        assert!(screen_text(buffer).contains("Write something..."));
        let (r, g, b) = LIFE_COLORS[0];
        assert_eq!(buffer[(39, 0)].bg, Color::Rgb(r, g, b));
        Ok(())
    }

    #[test]
    fn test_render_drained_bar() -> Result<()> {
        let session = SharedSession::default();
        let start = Instant::now();
        let KeystrokeOutcome::StartTimer(timer) = session.lock().apply(Edit::Insert('h'), start)
        else {
            panic!("timer should start");
        };
        session.lock().apply(Edit::Insert('i'), start);
        session.lock().tick(
            &timer,
            &DecayEvaluator::default(),
            start + Duration::from_secs(4),
        );
        let (app, _dir) = create_app(session)?;
        let mut terminal = Terminal::new(TestBackend::new(40, 8))?;

        terminal.draw(|frame| render(frame, &app))?;

        let buffer = terminal.backend().buffer();
        assert!(row_text(buffer, 0).trim_end().ends_with("50%"));
        let (r, g, b) = LIFE_COLORS[3];
        assert_eq!(buffer[(19, 0)].bg, Color::Rgb(r, g, b));
        assert_eq!(buffer[(20, 0)].bg, Color::Reset);
        assert!(screen_text(buffer).contains("hi"));
        Ok(())
    }
}
