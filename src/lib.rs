pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod timestamps;
pub mod tracker;
pub mod ui;
pub mod state;

pub use app::router;
pub use errors::{AppError, TrackerError};
pub use state::AppState;
pub use storage::resolve_db_path;
pub use tracker::SleepTracker;
