use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::WeekData;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;
use crate::week::DAYS_PER_WEEK;

/// Habit tracker rows: seven check marks followed by the name
pub fn render_habits(f: &mut Frame, area: Rect, data: &WeekData, palette: &Palette) {
    let name_width = (area.width as usize).saturating_sub(DAYS_PER_WEEK + 3);
    let mut lines: Vec<Line> = data
        .habits
        .iter()
        .map(|habit| {
            let checks: String = (0..DAYS_PER_WEEK)
                .map(|d| if habit.is_checked(d) { '■' } else { '·' })
                .collect();
            Line::from(vec![
                Span::styled(checks, palette.highlight_text()),
                Span::raw(" "),
                Span::raw(truncate(&habit.name, name_width)),
            ])
        })
        .collect();

    if !data.reminders.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("Reminders"));
        for reminder in &data.reminders {
            let mark = if reminder.completed { "✓" } else { "○" };
            lines.push(Line::from(truncate(&format!("{} {}", mark, reminder.text), name_width + DAYS_PER_WEEK)));
        }
    }

    let paragraph = Paragraph::new(lines).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Habits ({}%)", data.habit_progress()))
            .style(palette.base()),
    );
    f.render_widget(paragraph, area);
}
