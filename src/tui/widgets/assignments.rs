use chrono::NaiveDate;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::models::{Assignment, AssignmentPriority, AssignmentType, WeekData};
use crate::planner::{remaining_days, remaining_label};
use crate::tui::widgets::color::Palette;

/// Dashboard counters shown in the sidebar
pub fn render_assignment_stats(
    f: &mut Frame,
    area: Rect,
    data: &WeekData,
    filter: Option<AssignmentType>,
    palette: &Palette,
) {
    let stats = data.assignment_stats();
    let lines = vec![
        Line::from(format!("Total       {}", stats.total)),
        Line::from(format!("Submitted   {}", stats.completed)),
        Line::from(format!("Pending     {}", stats.pending)),
        Line::from(format!("High prio.  {}", stats.high_priority)),
        Line::from(format!("Completion  {}%", stats.completion_rate())),
        Line::from(""),
        Line::from(format!("Filter: {}", filter.map_or("all", |kind| kind.label()))),
    ];
    let paragraph = Paragraph::new(lines).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Assignments")
            .style(palette.base()),
    );
    f.render_widget(paragraph, area);
}

pub fn render_assignment_list(
    f: &mut Frame,
    area: Rect,
    assignments: &[&Assignment],
    selected: usize,
    today: NaiveDate,
    palette: &Palette,
) {
    let header = Row::new(["Status", "Type", "Class", "Title", "Due", "Priority", "Grade"])
        .style(palette.base().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = assignments
        .iter()
        .map(|a| {
            let due = if a.due_date.is_empty() {
                "-".to_string()
            } else {
                format!("{} {} ({})", a.due_date, a.deadline_time, remaining_label(remaining_days(&a.due_date, today)))
            };
            let priority_style = match a.priority {
                AssignmentPriority::High => palette.holiday(),
                _ => palette.base(),
            };
            Row::new(vec![
                Cell::from(a.status.label()),
                Cell::from(a.kind.label()),
                Cell::from(a.class_name.clone()),
                Cell::from(a.title.clone()),
                Cell::from(due),
                Cell::from(a.priority.label()).style(priority_style),
                Cell::from(a.grade.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Percentage(15),
        Constraint::Min(10),
        Constraint::Length(28),
        Constraint::Length(7),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("List ({})", assignments.len()))
                .style(palette.base()),
        )
        .style(palette.base())
        .row_highlight_style(palette.highlight());

    let mut state = TableState::default();
    if !assignments.is_empty() {
        state.select(Some(selected.min(assignments.len() - 1)));
    }
    f.render_stateful_widget(table, area, &mut state);
}
