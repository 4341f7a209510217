pub mod chart;
pub mod colormap;
pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_tabs(frame, chunks[1], app);

    let tab = app.active_tab();
    tab.render(frame, chunks[2], app.dataset());

    draw_footer(frame, chunks[3], app, tab.key_hints());
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let dashboard = &app.config().dashboard;
    let lines = vec![
        Line::from(Span::styled(
            dashboard.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            dashboard.header.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            dashboard.subheader.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(vec![
            Span::styled("Overview: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(dashboard.overview.clone()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(paragraph, area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .tab_titles()
        .into_iter()
        .enumerate()
        .map(|(i, title)| Line::from(format!("{} {}", i + 1, title)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected_tab())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App, hints: &str) {
    let mut spans = vec![
        Span::styled(
            "q: Quit | Tab/1-4: Switch | r: Refetch APOD | ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(hints.to_string(), Style::default().fg(Color::DarkGray)),
    ];
    if let Some(status) = app.status() {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
