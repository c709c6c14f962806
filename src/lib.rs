pub mod app;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gamification;
pub mod handlers;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod service;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod state;

pub use app::router;
pub use calendar::Clock;
pub use service::{CoreError, HabitService};
pub use state::AppState;
pub use storage::{JsonFileStore, MemoryStore, Store};
