use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
        Widget,
    },
};

use crate::app::App;
use crate::format::{format_optional, format_time};
use crate::stats::Statistics;
use crate::timer::Clock;
use crate::ui::charting::{bar_width, compute_chart_bounds, format_label, to_seconds};

pub fn stat_lines(stats: &Statistics) -> Vec<Line<'static>> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let entry = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<8}"), dim),
            Span::styled(value, bold),
        ])
    };

    vec![
        entry("Solves", stats.total_solves.to_string()),
        entry("Best", format_optional(stats.best_time)),
        entry("Worst", format_optional(stats.worst_time)),
        entry("Mean", format_optional(stats.mean)),
        entry("Median", format_optional(stats.median)),
        entry("Ao5", format_optional(stats.current_ao5)),
        entry("Ao12", format_optional(stats.current_ao12)),
        entry("Ao100", format_optional(stats.current_ao100)),
    ]
}

pub fn render<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let session_title = app
        .book()
        .active()
        .map(|s| format!("Session: {}", s.name))
        .unwrap_or_else(|| "Session".to_string());
    Paragraph::new(stat_lines(&app.session_stats()))
        .block(Block::default().borders(Borders::ALL).title(session_title))
        .render(cards[0], buf);

    Paragraph::new(stat_lines(&app.overall_stats()))
        .block(Block::default().borders(Borders::ALL).title("Overall"))
        .render(cards[1], buf);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    render_times_chart(app, charts[0], buf);
    render_distribution(app, charts[1], buf);
}

fn render_times_chart<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let points = to_seconds(&app.series());
    let (x_bounds, y_bounds) = compute_chart_bounds(&points);

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Times"))
        .x_axis(
            Axis::default()
                .title("solve")
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled("1", bold),
                    Span::styled(format_label(x_bounds[1]), bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("sec")
                .bounds(y_bounds)
                .labels(vec![
                    Span::styled(format_label(y_bounds[0]), bold),
                    Span::styled(format_label(y_bounds[1]), bold),
                ]),
        )
        .render(area, buf);
}

fn render_distribution<C: Clock + Clone>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bins = app.distribution();
    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            Bar::default()
                .value(bin.count as u64)
                .label(Line::from(format_time(bin.start)))
        })
        .collect();

    BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Distribution"),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, bins.len()))
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .render(area, buf);
}
