use crate::dataset::Dataset;
use crate::feeds::{ApodEntry, ApodState, FeedData, PictureState, PixelGrid};
use crate::ui::widgets::DashboardTab;
use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const MISSING_KEY_WARNING: &str =
    "NASA API key not found. Add it to secrets.toml or set NASA_API_KEY.";

/// Result of the live APOD request for the current display cycle.
pub struct ApodTab {
    state: ApodState,
    picture: PictureState,
    show_explanation: bool,
    scroll: u16,
}

impl ApodTab {
    pub fn new() -> Self {
        Self {
            state: ApodState::Loading,
            picture: PictureState::None,
            show_explanation: false,
            scroll: 0,
        }
    }

    pub fn state(&self) -> &ApodState {
        &self.state
    }

    pub fn picture(&self) -> &PictureState {
        &self.picture
    }

    pub fn explanation_visible(&self) -> bool {
        self.show_explanation
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Live data fetched from NASA's public APOD API.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];

        match &self.state {
            ApodState::Loading => lines.push(Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::DarkGray),
            ))),
            ApodState::NoCredential => lines.push(Line::from(Span::styled(
                format!("⚠ {}", MISSING_KEY_WARNING),
                Style::default().fg(Color::Yellow),
            ))),
            ApodState::ApiError(message) | ApodState::RequestFailed(message) => {
                lines.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )))
            }
            ApodState::Displayed(entry) => self.entry_lines(entry, width, &mut lines),
        }

        lines
    }

    fn entry_lines(&self, entry: &ApodEntry, width: u16, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(Span::styled(
            entry.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            entry.date.clone(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));

        if let Some(url) = &entry.image_url {
            match &self.picture {
                PictureState::Ready(grid) => {
                    lines.extend(pixel_lines(grid));
                    lines.push(Line::from(Span::styled(
                        format!(
                            "{}×{} px original",
                            grid.original_width, grid.original_height
                        ),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                PictureState::Loading => lines.push(Line::from(Span::styled(
                    "Loading image...",
                    Style::default().fg(Color::DarkGray),
                ))),
                PictureState::Failed(detail) => lines.push(Line::from(Span::styled(
                    format!("Image unavailable: {}", detail),
                    Style::default().fg(Color::Red),
                ))),
                PictureState::None => {}
            }
            lines.push(Line::from(Span::styled(
                url.clone(),
                Style::default().fg(Color::Blue),
            )));
            lines.push(Line::from(""));
        }

        let marker = if self.explanation_visible() { "▾" } else { "▸" };
        lines.push(Line::from(Span::styled(
            format!("{} Explanation", marker),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));

        if self.explanation_visible() {
            let wrap_width = (width as usize).saturating_sub(4).max(20);
            for line in textwrap::wrap(&entry.explanation, wrap_width) {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
    }
}

impl Default for ApodTab {
    fn default() -> Self {
        Self::new()
    }
}

/// Two pixel rows per terminal row: upper half as foreground, lower half as
/// background of a `▀` cell.
fn pixel_lines(grid: &PixelGrid) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(grid.cell_rows() as usize);
    lines.extend(grid.pixels.chunks(2).map(|pair| {
        let top = &pair[0];
        let bottom = pair.get(1).unwrap_or(top);
        Line::from(
            top.iter()
                .zip(bottom)
                .map(|(upper, lower)| {
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(upper.to_ratatui_color())
                            .bg(lower.to_ratatui_color()),
                    )
                })
                .collect::<Vec<_>>(),
        )
    }));
    lines
}

impl DashboardTab for ApodTab {
    fn title(&self) -> &str {
        "NASA APOD"
    }

    fn render(&self, frame: &mut Frame, area: Rect, _dataset: &Dataset) {
        let block = Block::default()
            .title(" NASA Astronomy Picture of the Day ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        let inner_width = block.inner(area).width;

        let paragraph = Paragraph::new(self.lines(inner_width))
            .block(block)
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn key_hints(&self) -> &str {
        "e: Explanation | r: Refetch | o: Open image"
    }

    fn update_data(&mut self, data: FeedData) {
        match data {
            FeedData::Loading => {
                self.state = ApodState::Loading;
                self.picture = PictureState::None;
                self.scroll = 0;
            }
            FeedData::Apod(state) => {
                self.picture = match &state {
                    ApodState::Displayed(ApodEntry {
                        image_url: Some(_), ..
                    }) => PictureState::Loading,
                    _ => PictureState::None,
                };
                self.state = state;
            }
            FeedData::Picture(picture) => {
                self.picture = picture;
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('e') => {
                self.show_explanation = !self.show_explanation;
                true
            }
            _ => false,
        }
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    fn selected_link(&self) -> Option<String> {
        match &self.state {
            ApodState::Displayed(entry) => entry.image_url.clone(),
            _ => None,
        }
    }
}
