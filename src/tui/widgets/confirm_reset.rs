use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

/// Modal asking before the week is wiped; `reset_selected` picks the highlighted option
pub fn render_confirm_reset(f: &mut Frame, area: Rect, week_label: &str, reset_selected: bool, palette: &Palette) {
    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled("Reset all data for this week?", palette.base())),
        Line::from(""),
        Line::from(Span::styled(week_label.to_string(), palette.base())),
        Line::from(""),
    ];

    for (option, selected) in [("Reset", reset_selected), ("Cancel", !reset_selected)] {
        let prefix = if selected { "> " } else { "  " };
        let style = if selected { palette.highlight() } else { palette.base() };
        lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Use ↑↓ to choose, Enter to confirm, Esc to cancel",
        palette.base(),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Reset")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
