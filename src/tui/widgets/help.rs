use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config, palette: &Palette) {
    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

/// Help text listing the configured bindings, so remapped keys show up as remapped
pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {}: Next tab\n", key(&kb.next_tab)));
    text.push_str(&format!(
        "  {} / {} / {}: Planner / Assignments / Finance\n",
        key(&kb.tab_1),
        key(&kb.tab_2),
        key(&kb.tab_3)
    ));
    text.push_str(&format!("  {} / {}: Previous / next week\n", key(&kb.prev_week), key(&kb.next_week)));
    text.push_str(&format!("  {}: Back to this week\n", key(&kb.current_week)));
    text.push_str(&format!("  {} / {}: Previous / next month\n", key(&kb.prev_month), key(&kb.next_month)));
    text.push_str(&format!("  {} / {}: Previous / next day\n", key(&kb.day_left), key(&kb.day_right)));
    text.push_str(&format!("  {} / {}: Move selection\n", key(&kb.list_up), key(&kb.list_down)));
    text.push('\n');

    text.push_str("Actions:\n");
    text.push_str(&format!("  {}: Toggle task / cycle assignment status\n", key(&kb.toggle)));
    text.push_str(&format!("  {}: Filter assignments by type\n", key(&kb.cycle_filter)));
    text.push_str(&format!("  {}: Generate a new quote\n", key(&kb.generate_quote)));
    text.push_str(&format!("  {}: Export week as JSON\n", key(&kb.export)));
    text.push_str(&format!("  {}: Reset week\n", key(&kb.reset)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_follows_bindings() {
        let mut config = Config::default();
        config.key_bindings.generate_quote = "Ctrl+g".to_string();
        let text = build_help_text(&config);
        assert!(text.contains(": Generate a new quote"));
        assert!(!text.contains("\n  g: Generate"));
        assert!(text.contains("Quit"));
    }
}
