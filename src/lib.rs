pub mod api;
pub mod attempts;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod mastery;
pub mod planner;
pub mod progress;
pub mod quiz;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod storage;
pub mod syllabus;

pub use error::RevosError;
pub use state::app::AppState;
