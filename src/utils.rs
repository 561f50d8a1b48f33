use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "jplan-dev",
            Profile::Prod => "jplan",
        }
    }
}

/// Configuration directory; the dev profile gets its own "jplan-dev" directory
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "jplan", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Data directory (database, exports, log file)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "jplan", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Parse and normalize an `HH:MM` time, e.g. "9:05" becomes "09:05"
pub fn parse_time(time_str: &str) -> Result<String, chrono::ParseError> {
    chrono::NaiveTime::parse_from_str(time_str.trim(), "%H:%M").map(|t| t.format("%H:%M").to_string())
}

/// Parsed key binding information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

impl ParsedKeyBinding {
    /// Whether `event` triggers this binding
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.requires_ctrl != has_primary_modifier(event.modifiers) {
            return false;
        }
        // Shifted letters arrive uppercase, so a binding of "R" already means Shift+r
        self.key_code == event.code
    }
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
/// On macOS, "Ctrl+" is replaced with "Opt+"
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "["), special keys ("Enter", "Left", "F1"),
/// and the Ctrl modifier ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        "Insert" => Ok(KeyCode::Insert),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}
