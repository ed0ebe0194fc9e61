use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::format::format_optional;
use crate::timer::{Clock, Phase};

const SCRAMBLE_PLACEHOLDER: &str = "Generating scramble...";

pub fn clock_style(phase: Phase) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match phase {
        Phase::Idle => bold,
        Phase::Armed => bold.fg(Color::Yellow),
        Phase::Running => bold.fg(Color::Green),
        Phase::Finished => bold.fg(Color::Cyan),
    }
}

pub fn render<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let scramble = app
        .book()
        .current_scramble()
        .unwrap_or(SCRAMBLE_PLACEHOLDER);
    let width = area.width.max(1) as usize;
    let scramble_lines = scramble.width().div_ceil(width).max(1) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(scramble_lines),
            Constraint::Length(2),
            Constraint::Length(1), // clock
            Constraint::Length(1), // hint
            Constraint::Length(2),
            Constraint::Length(1), // live stats
            Constraint::Min(0),
        ])
        .split(area);

    let scramble_style = if app.book().current_scramble().is_some() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC)
    };
    Paragraph::new(Span::styled(scramble, scramble_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    render_clock(app, chunks[3], chunks[4], buf);

    let stats = app.session_stats();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let row = Line::from(vec![
        Span::styled("solves ", dim),
        Span::styled(stats.total_solves.to_string(), bold),
        Span::styled("   best ", dim),
        Span::styled(format_optional(stats.best_time), bold),
        Span::styled("   ao5 ", dim),
        Span::styled(format_optional(stats.current_ao5), bold),
        Span::styled("   ao12 ", dim),
        Span::styled(format_optional(stats.current_ao12), bold),
        Span::styled("   mean ", dim),
        Span::styled(format_optional(stats.mean), bold),
    ]);
    Paragraph::new(row)
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

/// Clock and hint only, vertically centred.
pub fn render_focus<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    render_clock(app, chunks[1], chunks[2], buf);
}

fn render_clock<C: Clock + Clone>(app: &App<C>, clock: Rect, hint: Rect, buf: &mut Buffer) {
    let timer = app.timer();
    Paragraph::new(Span::styled(timer.display(), clock_style(timer.phase())))
        .alignment(Alignment::Center)
        .render(clock, buf);

    Paragraph::new(Span::styled(
        timer.hint(),
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(hint, buf);
}
