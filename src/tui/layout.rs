use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub tabs_area: Rect,
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Seven calendar columns of four characters plus borders
    pub const SIDEBAR_WIDTH: u16 = 30;
    /// Sidebar plus a usable main pane
    pub const MIN_WIDTH: u16 = 60;
    /// Tabs, a month grid with its holidays, and the status line
    pub const MIN_HEIGHT: u16 = 20;

    pub fn calculate(size: Rect) -> Self {
        // Lay out at the minimum size even if the terminal shrinks below it
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(Self::SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(vertical[1]);

        Self {
            inner_area,
            tabs_area: vertical[0],
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            status_area: vertical[2],
        }
    }
}
