use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

use crate::tui::app::Tab;
use crate::tui::widgets::color::Palette;

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, palette: &Palette) {
    // Padded titles read as boxes; the number is the jump key
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(Span::raw(format!("  {} {}  ", tab.index() + 1, tab.title()))))
        .collect();

    let tabs = Tabs::new(titles)
        .select(current_tab.index())
        .style(palette.base())
        .highlight_style(palette.highlight().add_modifier(Modifier::BOLD))
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
