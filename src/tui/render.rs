use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::tui::app::{App, Mode, Tab};
use crate::tui::widgets::{
    assignments::{render_assignment_list, render_assignment_stats},
    calendar::{calendar_height, render_calendar},
    color::Palette,
    confirm_reset::render_confirm_reset,
    finance::{render_finance_summary, render_finance_tables},
    habits::render_habits,
    help::render_help,
    status_bar::render_status_bar,
    tabs::render_tabs,
    week_view::{render_day, render_quote, render_week_strip},
};
use crate::tui::Layout;
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = Palette::from_theme(&app.config.theme);
    let screen = f.area();

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("jplan - {}", app.week.label()))
        .title_alignment(Alignment::Center)
        .style(palette.base());
    f.render_widget(outer_block, screen);

    render_tabs(f, layout.tabs_area, app.ui.current_tab, &palette);

    match app.ui.current_tab {
        Tab::Planner => render_planner(f, app, layout, &palette),
        Tab::Assignments => {
            render_assignment_stats(f, layout.sidebar_area, &app.data, app.ui.assignment_filter, &palette);
            let assignments = app.visible_assignments();
            render_assignment_list(f, layout.main_area, &assignments, app.ui.assignment_index, app.today, &palette);
        }
        Tab::Finance => {
            render_finance_summary(f, layout.sidebar_area, &app.data.finance, &palette);
            render_finance_tables(f, layout.main_area, &app.data.finance, &palette);
        }
    }

    let hints = key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_deref(),
        &hints,
        app.status.last_saved.as_deref(),
        app.status.dirty,
        &palette,
    );

    match app.ui.mode {
        Mode::View => {}
        Mode::Help => render_help(f, screen, &app.config, &palette),
        Mode::ConfirmReset { reset_selected } => {
            render_confirm_reset(f, screen, &app.week.label(), reset_selected, &palette)
        }
    }
}

fn render_planner(f: &mut Frame, app: &App, layout: &Layout, palette: &Palette) {
    let grid = app.month_grid();
    let holiday_rows = grid.month_holidays().len() as u16;
    let sidebar = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(calendar_height(&grid) + holiday_rows.min(6) + 2),
            Constraint::Min(3),
        ])
        .split(layout.sidebar_area);
    render_calendar(f, sidebar[0], &grid, palette);
    render_habits(f, sidebar[1], &app.data, palette);

    let main = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4), Constraint::Min(8)])
        .split(layout.main_area);
    render_quote(f, main[0], &app.data.quote, palette);
    render_week_strip(f, main[1], &app.data, &app.week, app.ui.focused_day, app.today, palette);
    render_day(
        f,
        main[2],
        app.data.day(app.ui.focused_day),
        app.focused_date(),
        app.ui.task_index,
        palette,
    );
}

/// Hints for the status bar, most useful first for the current tab
fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    let mut hints = vec![
        format!("{}: Quit", key(&kb.quit)),
        format!("{}: Help", key(&kb.help)),
        format!("{}: Save", key(&kb.save)),
    ];
    match app.ui.current_tab {
        Tab::Planner => {
            hints.push(format!("{}/{}: Day", key(&kb.day_left), key(&kb.day_right)));
            hints.push(format!("{}: Toggle task", key(&kb.toggle)));
            hints.push(format!("{}: Quote", key(&kb.generate_quote)));
        }
        Tab::Assignments => {
            hints.push(format!("{}: Next status", key(&kb.toggle)));
            hints.push(format!("{}: Filter", key(&kb.cycle_filter)));
        }
        Tab::Finance => {}
    }
    hints.push(format!("{}/{}: Week", key(&kb.prev_week), key(&kb.next_week)));
    hints.push(format!("{}/{}: Month", key(&kb.prev_month), key(&kb.next_month)));
    hints.push(format!("{}: Export", key(&kb.export)));
    hints.push(format!("{}: Reset", key(&kb.reset)));
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Database};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> App {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        App::with_today(Config::default(), Database::in_memory().unwrap(), today, 0).unwrap()
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| {
                let layout = Layout::calculate(f.area());
                render(f, app, &layout);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_planner_renders() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(screen.contains("Planner"));
        assert!(screen.contains("Priorities"));
        assert!(screen.contains("Holidays"));
        assert!(screen.contains("q: Quit"));
    }

    #[test]
    fn test_other_tabs_and_modals_render() {
        let mut app = app();
        app.switch_tab(Tab::Finance);
        assert!(draw(&mut app).contains("Daily ledger"));

        app.switch_tab(Tab::Assignments);
        app.ui.mode = Mode::ConfirmReset { reset_selected: true };
        let screen = draw(&mut app);
        assert!(screen.contains("Completion"));
        assert!(screen.contains("Confirm Reset"));

        app.ui.mode = Mode::Help;
        assert!(draw(&mut app).contains("Key Bindings"));
    }

    #[test]
    fn test_status_bar_shows_unsaved_changes() {
        let mut app = app();
        assert!(!draw(&mut app).contains("[modified]"));
        app.status.dirty = true;
        assert!(draw(&mut app).contains("[modified]"));
    }

    #[test]
    fn test_key_hints_follow_tab() {
        let mut app = app();
        assert!(key_hints(&app).iter().any(|h| h.ends_with("Toggle task")));
        app.switch_tab(Tab::Assignments);
        assert!(key_hints(&app).iter().any(|h| h == "f: Filter"));
    }
}
