use ratatui::style::{Color, Style};

use crate::config::Theme;

/// Parse a theme color: names ("lightred", "dark-gray"), hex ("#1e1e2e") or an ANSI index ("208")
/// Unrecognized values fall back to white.
pub fn parse_color(color_str: &str) -> Color {
    color_str.trim().parse::<Color>().unwrap_or(Color::White)
}

/// Black or white, whichever reads better on `background`
pub fn get_contrast_text_color(background: Color) -> Color {
    let (r, g, b) = match background {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black | Color::DarkGray | Color::Blue | Color::Red | Color::Magenta => return Color::White,
        Color::Reset | Color::Indexed(_) => return Color::White,
        _ => return Color::Black,
    };
    // ITU-R BT.601 luma
    let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luma > 128.0 { Color::Black } else { Color::White }
}

/// Theme colors resolved once per frame
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub holiday_fg: Color,
}

impl Palette {
    pub fn from_theme(theme: &Theme) -> Self {
        let highlight_bg = parse_color(&theme.highlight_bg);
        Self {
            fg: parse_color(&theme.fg),
            bg: parse_color(&theme.bg),
            highlight_bg,
            highlight_fg: get_contrast_text_color(highlight_bg),
            holiday_fg: parse_color(&theme.holiday_fg),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }

    /// Accent text on the normal background
    pub fn highlight_text(&self) -> Style {
        Style::default().fg(self.highlight_bg).bg(self.bg)
    }

    pub fn holiday(&self) -> Style {
        Style::default().fg(self.holiday_fg).bg(self.bg)
    }
}
