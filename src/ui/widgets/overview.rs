use crate::dataset::stats::{describe, format_stat, ColumnSummary, STAT_LABELS};
use crate::dataset::Dataset;
use crate::ui::widgets::DashboardTab;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

const MAX_COLUMN_WIDTH: usize = 24;
const PAGE: usize = 10;

/// Raw rows plus descriptive statistics of every numeric column.
pub struct OverviewTab {
    summaries: Vec<ColumnSummary>,
    column_widths: Vec<u16>,
    row_count: usize,
    column_offset: usize,
    scroll_state: TableState,
}

impl OverviewTab {
    pub fn new(dataset: &Dataset) -> Self {
        let mut scroll_state = TableState::default();
        if !dataset.is_empty() {
            scroll_state.select(Some(0));
        }

        let column_widths = dataset
            .headers()
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let widest_cell = dataset
                    .rows()
                    .iter()
                    .map(|row| row[idx].chars().count())
                    .max()
                    .unwrap_or(0);
                header
                    .chars()
                    .count()
                    .max(widest_cell)
                    .clamp(4, MAX_COLUMN_WIDTH) as u16
            })
            .collect();

        Self {
            summaries: describe(dataset),
            column_widths,
            row_count: dataset.len(),
            column_offset: 0,
            scroll_state,
        }
    }

    pub fn summaries(&self) -> &[ColumnSummary] {
        &self.summaries
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.scroll_state.selected()
    }

    fn select(&mut self, row: usize) {
        if self.row_count > 0 {
            self.scroll_state
                .select(Some(row.min(self.row_count - 1)));
        }
    }

    fn render_raw(&self, frame: &mut Frame, area: Rect, dataset: &Dataset) {
        let offset = self.column_offset.min(dataset.headers().len().saturating_sub(1));
        let index_width = self.row_count.to_string().len().max(1) as u16;

        let header = Row::new(
            std::iter::once(String::new())
                .chain(dataset.headers()[offset..].iter().cloned()),
        )
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let rows = dataset.rows().iter().enumerate().map(|(i, row)| {
            Row::new(
                std::iter::once(i.to_string()).chain(row[offset..].iter().cloned()),
            )
        });

        let widths: Vec<Constraint> = std::iter::once(Constraint::Length(index_width))
            .chain(
                self.column_widths[offset..]
                    .iter()
                    .map(|w| Constraint::Length(*w)),
            )
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(format!(" Dataset Preview ({} rows) ", self.row_count))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::White)),
            )
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = self.scroll_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Descriptive Statistics ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        if self.summaries.is_empty() {
            let empty = Paragraph::new("No numeric columns").block(block);
            frame.render_widget(empty, area);
            return;
        }

        let offset = self.column_offset.min(self.summaries.len() - 1);
        let visible = &self.summaries[offset..];

        let header = Row::new(
            std::iter::once(String::new()).chain(visible.iter().map(|s| s.name.clone())),
        )
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let rows = STAT_LABELS.iter().enumerate().map(|(i, label)| {
            Row::new(
                std::iter::once(label.to_string())
                    .chain(visible.iter().map(|s| format_stat(s.values()[i]))),
            )
        });

        let widths: Vec<Constraint> = std::iter::once(Constraint::Length(5))
            .chain(
                visible
                    .iter()
                    .map(|s| Constraint::Length(s.name.chars().count().clamp(12, MAX_COLUMN_WIDTH) as u16)),
            )
            .collect();

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}

impl DashboardTab for OverviewTab {
    fn title(&self) -> &str {
        "Overview & Data"
    }

    fn render(&self, frame: &mut Frame, area: Rect, dataset: &Dataset) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(STAT_LABELS.len() as u16 + 3),
            ])
            .split(area);

        let caption = Style::default().fg(Color::Gray);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Raw water quality measurements from Biscayne Bay.",
                caption,
            ))),
            chunks[0],
        );
        self.render_raw(frame, chunks[1], dataset);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Summary statistics for numeric variables.",
                caption,
            ))),
            chunks[2],
        );
        self.render_stats(frame, chunks[3]);
    }

    fn key_hints(&self) -> &str {
        "↑↓/PgUp/PgDn: Rows | ←→: Columns"
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Left => {
                self.column_offset = self.column_offset.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.column_offset + 1 < self.column_widths.len() {
                    self.column_offset += 1;
                }
            }
            KeyCode::PageUp => {
                let row = self.scroll_state.selected().unwrap_or(0);
                self.select(row.saturating_sub(PAGE));
            }
            KeyCode::PageDown => {
                let row = self.scroll_state.selected().unwrap_or(0);
                self.select(row + PAGE);
            }
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(self.row_count.saturating_sub(1)),
            _ => return false,
        }
        true
    }

    fn scroll_up(&mut self) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected > 0 {
                self.scroll_state.select(Some(selected - 1));
            }
        }
    }

    fn scroll_down(&mut self) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected < self.row_count.saturating_sub(1) {
                self.scroll_state.select(Some(selected + 1));
            }
        }
    }
}
