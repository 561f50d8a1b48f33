use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending in "..." when some are dropped
pub fn fit_hints(hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for (i, hint) in hints.iter().enumerate() {
        let current_len = text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if i == 0 {
                return truncate(hint, max_width);
            }
            if current_len + ELLIPSIS.len() > max_width {
                text = text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            }
            text.push_str(ELLIPSIS);
            return text;
        }

        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

/// Right-hand save indicator: unsaved edits win over the last save time
pub fn save_indicator(dirty: bool, last_saved: Option<&str>) -> String {
    match (dirty, last_saved) {
        (true, _) => " [modified]".to_string(),
        (false, Some(t)) => format!(" saved {}", t),
        (false, None) => String::new(),
    }
}

/// One line: the transient message if any, otherwise key hints with the save state on the right
pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&str>,
    key_hints: &[String],
    last_saved: Option<&str>,
    dirty: bool,
    palette: &Palette,
) {
    let width = area.width as usize;

    let paragraph = match message {
        Some(msg) => Paragraph::new(truncate(msg, width))
            .style(palette.highlight().add_modifier(Modifier::BOLD)),
        None => {
            let saved = save_indicator(dirty, last_saved);
            let hints_width = width.saturating_sub(saved.chars().count());
            let hints = fit_hints(key_hints, hints_width);
            let padding = hints_width.saturating_sub(hints.chars().count());
            Paragraph::new(format!("{}{}{}", hints, " ".repeat(padding), saved)).style(palette.base())
        }
    };

    f.render_widget(paragraph, area);
}
