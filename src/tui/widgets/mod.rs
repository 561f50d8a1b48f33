pub mod assignments;
pub mod calendar;
pub mod color;
pub mod confirm_reset;
pub mod finance;
pub mod habits;
pub mod help;
pub mod status_bar;
pub mod tabs;
pub mod week_view;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect taking a percentage of `area`
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut `text` to `max_width` characters, ending in "..." when shortened
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(3)).collect();
    out.push_str("...");
    out.chars().take(max_width).collect()
}
