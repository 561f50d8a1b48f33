use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::jalali::WeekdayStrategy;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub export_dir: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_reset")]
    pub reset: String,
    #[serde(default = "default_export")]
    pub export: String,
    #[serde(default = "default_generate_quote")]
    pub generate_quote: String,
    #[serde(default = "default_prev_week")]
    pub prev_week: String,
    #[serde(default = "default_next_week")]
    pub next_week: String,
    #[serde(default = "default_current_week")]
    pub current_week: String,
    #[serde(default = "default_prev_month")]
    pub prev_month: String,
    #[serde(default = "default_next_month")]
    pub next_month: String,
    #[serde(default = "default_next_tab")]
    pub next_tab: String,
    #[serde(default = "default_tab_1")]
    pub tab_1: String,
    #[serde(default = "default_tab_2")]
    pub tab_2: String,
    #[serde(default = "default_tab_3")]
    pub tab_3: String,
    #[serde(default = "default_day_left")]
    pub day_left: String,
    #[serde(default = "default_day_right")]
    pub day_right: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_toggle")]
    pub toggle: String,
    #[serde(default = "default_cycle_filter")]
    pub cycle_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// "epoch" computes month start weekdays directly, "anchored" searches around today
    #[serde(default)]
    pub first_weekday: WeekdayStrategy,
    #[serde(default = "default_true")]
    pub show_holidays: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_quote_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_holiday_fg")]
    pub holiday_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            export_dir: None,
            log_level: default_log_level(),
            config_version: Some(CURRENT_CONFIG_VERSION),
            key_bindings: KeyBindings::default(),
            calendar: CalendarConfig::default(),
            quote: QuoteConfig::default(),
            theme: Theme::default(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            save: default_save(),
            reset: default_reset(),
            export: default_export(),
            generate_quote: default_generate_quote(),
            prev_week: default_prev_week(),
            next_week: default_next_week(),
            current_week: default_current_week(),
            prev_month: default_prev_month(),
            next_month: default_next_month(),
            next_tab: default_next_tab(),
            tab_1: default_tab_1(),
            tab_2: default_tab_2(),
            tab_3: default_tab_3(),
            day_left: default_day_left(),
            day_right: default_day_right(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            toggle: default_toggle(),
            cycle_filter: default_cycle_filter(),
        }
    }
}

impl KeyBindings {
    /// (name, binding) pairs, used for validation and the help popup
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("quit", &self.quit),
            ("help", &self.help),
            ("save", &self.save),
            ("reset", &self.reset),
            ("export", &self.export),
            ("generate_quote", &self.generate_quote),
            ("prev_week", &self.prev_week),
            ("next_week", &self.next_week),
            ("current_week", &self.current_week),
            ("prev_month", &self.prev_month),
            ("next_month", &self.next_month),
            ("next_tab", &self.next_tab),
            ("tab_1", &self.tab_1),
            ("tab_2", &self.tab_2),
            ("tab_3", &self.tab_3),
            ("day_left", &self.day_left),
            ("day_right", &self.day_right),
            ("list_up", &self.list_up),
            ("list_down", &self.list_down),
            ("toggle", &self.toggle),
            ("cycle_filter", &self.cycle_filter),
        ]
    }

    /// Check that every binding parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, binding) in self.entries() {
            utils::parse_key_binding(binding)
                .map_err(|e| ConfigError::KeyBindingError(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_weekday: WeekdayStrategy::default(),
            show_holidays: true,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_quote_endpoint(),
            model: default_quote_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            holiday_fg: default_holiday_fg(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("planner.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/jplan/planner.db".to_string()
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

fn default_true() -> bool {
    true
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_reset() -> String {
    "R".to_string()
}

fn default_export() -> String {
    "x".to_string()
}

fn default_generate_quote() -> String {
    "g".to_string()
}

fn default_prev_week() -> String {
    "[".to_string()
}

fn default_next_week() -> String {
    "]".to_string()
}

fn default_current_week() -> String {
    "t".to_string()
}

fn default_prev_month() -> String {
    "<".to_string()
}

fn default_next_month() -> String {
    ">".to_string()
}

fn default_next_tab() -> String {
    "Tab".to_string()
}

fn default_tab_1() -> String {
    "1".to_string()
}

fn default_tab_2() -> String {
    "2".to_string()
}

fn default_tab_3() -> String {
    "3".to_string()
}

fn default_day_left() -> String {
    "Left".to_string()
}

fn default_day_right() -> String {
    "Right".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_toggle() -> String {
    "Space".to_string()
}

fn default_cycle_filter() -> String {
    "f".to_string()
}

fn default_quote_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_quote_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_holiday_fg() -> String {
    "lightred".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid key binding: {0}")]
    KeyBindingError(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            let mut config = Self::load_from_path(&config_path)?;
            // Ensure database path matches profile (in case config was manually edited)
            config.database_path = Self::default_database_path_for_profile(profile);
            Ok(config)
        } else {
            // Create default config and save it
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            let save_result = config.save_to_path(&config_path);
            if let Err(ref e) = save_result {
                tracing::error!(path = %config_path.display(), error = %e, "failed to save config file");
            }
            save_result?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file; the database path is taken as written
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.key_bindings.validate()?;
        Ok(config)
    }

    fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("planner.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/jplan-dev/planner.db".to_string(),
                utils::Profile::Prod => "~/.local/share/jplan/planner.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Directory JSON exports are written to; defaults to the database's directory
    pub fn get_export_dir(&self) -> PathBuf {
        match self.export_dir {
            Some(ref dir) => utils::expand_path(dir),
            None => self
                .get_database_path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            database_path = "/tmp/planner.db"

            [calendar]
            first_weekday = "anchored"

            [key_bindings]
            quit = "Q"
            "#,
        )
        .unwrap();
        assert_eq!(config.calendar.first_weekday, WeekdayStrategy::Anchored);
        assert!(config.calendar.show_holidays);
        assert_eq!(config.key_bindings.quit, "Q");
        assert_eq!(config.key_bindings.save, "Ctrl+s");
        assert_eq!(config.quote.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.get_export_dir(), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.key_bindings.entries(), config.key_bindings.entries());
        assert_eq!(parsed.calendar.first_weekday, WeekdayStrategy::Epoch);
    }

    #[test]
    fn test_default_key_bindings_are_valid() {
        assert!(KeyBindings::default().validate().is_ok());
        let bad = KeyBindings { save: "Ctrl+Hyper".to_string(), ..KeyBindings::default() };
        assert!(matches!(bad.validate(), Err(ConfigError::KeyBindingError(_))));
    }

    #[test]
    fn test_load_from_path_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.export_dir = Some("/tmp/exports".to_string());
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.export_dir.as_deref(), Some("/tmp/exports"));
        assert_eq!(loaded.config_version, Some(CURRENT_CONFIG_VERSION));
    }
}
