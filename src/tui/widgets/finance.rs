use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use crate::jalali::WEEKDAY_NAMES_LATIN;
use crate::models::{FinanceCategory, FinanceData};
use crate::tui::widgets::color::Palette;

pub fn render_finance_summary(f: &mut Frame, area: Rect, finance: &FinanceData, palette: &Palette) {
    let summary = finance.summary();
    let mut lines: Vec<Line> = FinanceCategory::ALL
        .iter()
        .map(|category| {
            let totals = summary.totals(*category);
            Line::from(format!("{:<9}{:>8.0}/{:<8.0}", category.label(), totals.actual, totals.budget))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Daily ledger  {:.0}", summary.daily_total)));
    lines.push(Line::from(format!("Spending      {:.0}", summary.current_spending())));

    let remaining = summary.remaining_to_spend();
    let remaining_style = if remaining < 0.0 { palette.holiday() } else { palette.base() };
    lines.push(Line::styled(format!("Remaining     {:.0}", remaining), remaining_style.add_modifier(Modifier::BOLD)));

    let paragraph = Paragraph::new(lines).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Budget")
            .style(palette.base()),
    );
    f.render_widget(paragraph, area);
}

/// Budget items grouped by category above the daily ledger
pub fn render_finance_tables(f: &mut Frame, area: Rect, finance: &FinanceData, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Min(3)])
        .split(area);
    let bold = palette.base().add_modifier(Modifier::BOLD);

    let mut rows = Vec::new();
    for category in FinanceCategory::ALL {
        let items = finance.items(category);
        rows.push(Row::new([category.label().to_string()]).style(palette.highlight_text().add_modifier(Modifier::BOLD)));
        for item in items {
            rows.push(Row::new([
                format!("  {}", item.label),
                format!("{:.0}", item.budget),
                format!("{:.0}", item.actual),
                format!("{:.0}%", item.remaining_percent()),
            ]));
        }
    }
    let items_table = Table::new(
        rows,
        [Constraint::Min(16), Constraint::Length(12), Constraint::Length(12), Constraint::Length(8)],
    )
    .header(Row::new(["Item", "Budget", "Actual", "Left"]).style(bold))
    .block(Block::default().borders(Borders::ALL).title("Budget items").style(palette.base()))
    .style(palette.base());
    f.render_widget(items_table, chunks[0]);

    let ledger_rows: Vec<Row> = finance
        .daily_transactions
        .iter()
        .map(|tx| {
            let day = WEEKDAY_NAMES_LATIN
                .get(tx.day_index as usize)
                .map_or("?", |name| &name[..3]);
            Row::new([day.to_string(), tx.label.clone(), format!("{:.0}", tx.amount)])
        })
        .collect();
    let ledger = Table::new(
        ledger_rows,
        [Constraint::Length(5), Constraint::Min(16), Constraint::Length(12)],
    )
    .header(Row::new(["Day", "Label", "Amount"]).style(bold))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Daily ledger ({})", finance.daily_transactions.len()))
            .style(palette.base()),
    )
    .style(palette.base());
    f.render_widget(ledger, chunks[1]);
}
