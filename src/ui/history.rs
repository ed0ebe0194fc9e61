use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::app::App;
use crate::format::{format_solve, format_time_detailed};
use crate::solve::{Penalty, Solve};
use crate::timer::Clock;
use crate::ui::truncate_to_width;

const TIME_WIDTH: u16 = 10;
const PENALTY_WIDTH: u16 = 7;
const DATE_WIDTH: u16 = 16;

fn penalty_cell(solve: &Solve) -> Cell<'static> {
    match solve.penalty {
        Some(Penalty::PlusTwo) => Cell::from("+2").style(Style::default().fg(Color::Yellow)),
        Some(Penalty::Dnf) => Cell::from("DNF").style(Style::default().fg(Color::Red)),
        None => Cell::from(""),
    }
}

pub fn render<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History - {}", crate::ui::session_line(app)));

    let history = app.history();
    if history.is_empty() {
        Paragraph::new(Span::styled(
            "No solves yet",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let area = chunks[0];

    // borders, index column, highlight symbol and column gaps
    let scramble_width = area
        .width
        .saturating_sub(2 + 5 + 3 + TIME_WIDTH + PENALTY_WIDTH + DATE_WIDTH + 5)
        as usize;

    let total = history.len();
    let rows: Vec<Row> = history
        .iter()
        .enumerate()
        .map(|(idx, solve)| {
            Row::new(vec![
                Cell::from((total - idx).to_string()),
                Cell::from(format_solve(solve)).style(Style::default().add_modifier(Modifier::BOLD)),
                penalty_cell(solve),
                Cell::from(truncate_to_width(&solve.scramble, scramble_width)),
                Cell::from(solve.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let header = Row::new(vec!["#", "Time", "Penalty", "Scramble", "Date"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(TIME_WIDTH),
            Constraint::Length(PENALTY_WIDTH),
            Constraint::Min(8),
            Constraint::Length(DATE_WIDTH),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.selected()));
    StatefulWidget::render(table, area, buf, &mut state);

    if let Some(solve) = app.selected_solve() {
        Paragraph::new(truncate_to_width(&detail_line(solve), chunks[1].width as usize))
            .style(Style::default().fg(Color::Gray))
            .render(chunks[1], buf);
    }
}

/// Raw time to the millisecond, penalty and full scramble of one solve.
pub fn detail_line(solve: &Solve) -> String {
    let penalty = match solve.penalty {
        Some(Penalty::PlusTwo) => " (+2)",
        Some(Penalty::Dnf) => " (DNF)",
        None => "",
    };
    format!(
        "{}{penalty}  {}  {}",
        format_time_detailed(solve.time_ms),
        solve.puzzle_type.display_name(),
        solve.scramble
    )
}
