pub mod apod;
pub mod depth;
pub mod overview;
pub mod trends;

use crate::dataset::Dataset;
use crate::feeds::FeedData;
use crossterm::event::KeyCode;
use ratatui::{layout::Rect, Frame};

/// One tab of the dashboard.
pub trait DashboardTab {
    fn title(&self) -> &str;

    fn render(&self, frame: &mut Frame, area: Rect, dataset: &Dataset);

    /// Short key reference shown in the footer while the tab is active.
    fn key_hints(&self) -> &str;

    fn update_data(&mut self, _data: FeedData) {}

    /// Tab-specific keys. Returns `false` when the key was not used so the
    /// app can apply its defaults.
    fn handle_key(&mut self, _key: KeyCode) -> bool {
        false
    }

    fn scroll_up(&mut self) {}

    fn scroll_down(&mut self) {}

    /// URL the `o` key should open, if any.
    fn selected_link(&self) -> Option<String> {
        None
    }
}
