use crate::tracker::SleepTracker;
use std::sync::Arc;

/// Shared handle passed to every route; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<SleepTracker>,
}

impl AppState {
    pub fn new(tracker: SleepTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }
}
