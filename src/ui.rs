pub mod charting;
pub mod history;
pub mod stats_view;
pub mod timer_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, NoticeLevel, View};
use crate::timer::Clock;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl<C: Clock + Clone> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // arming or running: nothing but the clock
        if self.timer().is_focus_mode() {
            timer_view::render_focus(self, area, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // tabs and session
                Constraint::Length(1), // padding
                Constraint::Min(1),    // view body
                Constraint::Length(1), // notice
                Constraint::Length(1), // legend
            ])
            .split(area);

        render_header(self, chunks[0], buf);

        match self.view() {
            View::Timer => timer_view::render(self, chunks[2], buf),
            View::History => history::render(self, chunks[2], buf),
            View::Stats => stats_view::render(self, chunks[2], buf),
        }

        render_notice(self, chunks[3], buf);

        Paragraph::new(Span::styled(
            legend(self.view()),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);
    }
}

fn render_header<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled("cubit  ", bold.fg(Color::Cyan))];

    for (idx, view) in [View::Timer, View::History, View::Stats].iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" | "));
        }
        let style = if *view == app.view() {
            bold.add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(view.title(), style));
    }

    Paragraph::new(Line::from(spans)).render(area, buf);

    Paragraph::new(Span::styled(session_line(app), Style::default().fg(Color::Gray)))
        .alignment(Alignment::Right)
        .render(area, buf);
}

/// "Default Session (3 solves) · 3x3 Cube"
pub fn session_line<C: Clock + Clone>(app: &App<C>) -> String {
    let puzzle = app.book().puzzle_type().display_name();
    match app.book().active() {
        Some(session) => format!(
            "{} ({} solves) · {}",
            session.name,
            session.solves.len(),
            puzzle
        ),
        None => format!("no session · {puzzle}"),
    }
}

fn render_notice<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    if let Some(prompt) = app.prompt() {
        let line = Line::from(vec![
            Span::styled(
                format!("{}: ", prompt.kind.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(prompt.input.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]);
        Paragraph::new(line).render(area, buf);
        return;
    }

    let Some(notice) = app.current_notice() else {
        return;
    };
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Paragraph::new(Span::styled(
        notice.message.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

pub fn legend(view: View) -> &'static str {
    match view {
        View::Timer => "(space) time / (esc) reset / (p)uzzle / (s)ession / (n)ew session / (tab) view / (q)uit",
        View::History => "(↑↓) select / (2) +2 / (d)nf / (c)ycle / (x) delete / (X) delete session / (R)ename / (a)dd time / (t)ype / (tab) view",
        View::Stats => "(s)ession / (p)uzzle / (tab) view / (q)uit",
    }
}

/// Cuts `text` to at most `max` display columns, marking the cut with "…".
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
