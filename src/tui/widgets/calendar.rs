use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::calendar::{DayCell, GridCell, MonthGrid};
use crate::jalali::WEEKDAY_NAMES_LATIN;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

const CELL_WIDTH: usize = 4;

/// Rows needed for the month grid: header plus up to six weeks, inside borders
pub fn calendar_height(grid: &MonthGrid) -> u16 {
    let weeks = grid.cells.len().div_ceil(7) as u16;
    weeks + 3
}

pub fn render_calendar(f: &mut Frame, area: Rect, grid: &MonthGrid, palette: &Palette) {
    let holidays = grid.month_holidays();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(calendar_height(grid)),
            Constraint::Min(0),
        ])
        .split(area);

    let mut lines = Vec::new();
    let header: String = WEEKDAY_NAMES_LATIN
        .iter()
        .map(|name| format!("{:>width$}", &name[..2], width = CELL_WIDTH))
        .collect();
    lines.push(Line::from(Span::styled(header, palette.base().add_modifier(Modifier::BOLD))));

    for week in grid.weeks() {
        let spans: Vec<Span> = week
            .iter()
            .map(|cell| match cell {
                GridCell::Blank => Span::styled(" ".repeat(CELL_WIDTH), palette.base()),
                GridCell::Day(day) => day_span(day, palette),
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(grid.view.title())
            .title_alignment(Alignment::Center)
            .style(palette.base()),
    );
    f.render_widget(calendar, chunks[0]);

    if holidays.is_empty() || chunks[1].height < 3 {
        return;
    }
    let max_width = chunks[1].width.saturating_sub(2) as usize;
    let holiday_lines: Vec<Line> = holidays
        .iter()
        .map(|h| Line::from(Span::styled(truncate(&format!("{:>2} {}", h.day, h.title), max_width), palette.holiday())))
        .collect();
    let list = Paragraph::new(holiday_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Holidays")
            .style(palette.base()),
    );
    f.render_widget(list, chunks[1]);
}

fn day_span(day: &DayCell, palette: &Palette) -> Span<'static> {
    let text = format!("{:>width$}", day.day, width = CELL_WIDTH);
    let style = if day.is_today {
        palette.highlight().add_modifier(Modifier::BOLD)
    } else if day.is_day_off() {
        palette.holiday()
    } else {
        palette.base()
    };
    Span::styled(text, style)
}
