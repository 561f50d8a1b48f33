use chrono::NaiveDate;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::jalali::{JalaliDate, WEEKDAY_NAMES_LATIN};
use crate::models::{DayData, WeekData};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;
use crate::week::{Week, DAYS_PER_WEEK};

pub fn render_quote(f: &mut Frame, area: Rect, quote: &str, palette: &Palette) {
    let paragraph = Paragraph::new(quote.to_string())
        .block(Block::default().borders(Borders::ALL).title("Quote").style(palette.base()))
        .style(palette.base().add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Seven boxes, Saturday first, with each day's task progress
pub fn render_week_strip(
    f: &mut Frame,
    area: Rect,
    data: &WeekData,
    week: &Week,
    focused_day: usize,
    today: NaiveDate,
    palette: &Palette,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, DAYS_PER_WEEK as u32); DAYS_PER_WEEK])
        .split(area);

    for (index, column) in columns.iter().enumerate() {
        let date = JalaliDate::from_gregorian(data.day_date(index, week));
        let progress = data
            .day(index)
            .filter(|d| !d.tasks.is_empty())
            .map(|d| format!("{}%", d.progress()))
            .unwrap_or_else(|| "-".to_string());

        let mut style = if index == focused_day { palette.highlight() } else { palette.base() };
        if week.index_of(today) == Some(index) {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }

        let lines = vec![
            Line::from(format!("{} {}", &WEEKDAY_NAMES_LATIN[index][..3], date.day)),
            Line::from(progress),
        ];
        let cell = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL).style(style));
        f.render_widget(cell, *column);
    }
}

/// Priorities, events and tasks of the focused day
pub fn render_day(
    f: &mut Frame,
    area: Rect,
    day: Option<&DayData>,
    date: JalaliDate,
    selected_task: usize,
    palette: &Palette,
) {
    let empty = DayData::default();
    let day = day.unwrap_or(&empty);
    let event_rows = day.events.len().clamp(1, 6) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(day.priorities.len().max(1) as u16 + 2),
            Constraint::Length(event_rows + 2),
            Constraint::Min(3),
        ])
        .split(area);
    let max_width = area.width.saturating_sub(4) as usize;

    let priorities: Vec<Line> = day
        .priorities
        .iter()
        .enumerate()
        .map(|(slot, text)| Line::from(truncate(&format!("{}. {}", slot + 1, text), max_width)))
        .collect();
    f.render_widget(
        Paragraph::new(priorities).style(palette.base()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} - Priorities", date))
                .style(palette.base()),
        ),
        chunks[0],
    );

    let events: Vec<Line> = if day.events.is_empty() {
        vec![Line::from("No events")]
    } else {
        day.events
            .iter()
            .map(|e| Line::from(vec![
                Span::styled(format!("{} ", e.time), palette.base().add_modifier(Modifier::BOLD)),
                Span::raw(truncate(&e.text, max_width.saturating_sub(6))),
            ]))
            .collect()
    };
    f.render_widget(
        Paragraph::new(events)
            .style(palette.base())
            .block(Block::default().borders(Borders::ALL).title("Schedule").style(palette.base())),
        chunks[1],
    );

    let items: Vec<ListItem> = day
        .tasks
        .iter()
        .map(|task| {
            let indicator = if task.completed { "✓" } else { "○" };
            ListItem::new(truncate(&format!("{} {}", indicator, task.text), max_width))
        })
        .collect();
    let title = format!("Tasks ({}/{}, {}%)", day.completed_tasks(), day.tasks.len(), day.progress());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title).style(palette.base()))
        .style(palette.base())
        .highlight_style(palette.highlight());

    let mut state = ListState::default();
    if !day.tasks.is_empty() {
        state.select(Some(selected_task.min(day.tasks.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[2], &mut state);
}
