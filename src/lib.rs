pub mod calendar;
pub mod cli;
pub mod config;
pub mod database;
pub mod export;
pub mod jalali;
pub mod logging;
pub mod models;
pub mod planner;
pub mod quote;
pub mod store;
pub mod tui;
pub mod utils;
pub mod week;

pub use config::Config;
pub use database::Database;
pub use jalali::JalaliDate;
pub use models::WeekData;
pub use store::{KeyValueStore, MemoryStore, PlannerStore};
pub use utils::Profile;
pub use week::Week;
