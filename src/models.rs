use serde::{Deserialize, Serialize};

/// A row of `sleep_records`, with timestamps kept as the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepRecord {
    pub id: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub is_completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub start_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndRequest {
    pub sleep_id: Option<i64>,
    pub end_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NapTimesRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// `date` from a JSON body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct DateRequest {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearDayResponse {
    pub message: String,
    pub records_deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub id: i64,
    pub start_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveResponse {
    pub active_session: Option<ActiveSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NapEntry {
    pub id: i64,
    pub start: String,
    pub end: String,
    pub duration: String,
}

/// Summary of the completed naps started on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaySummary {
    Recorded {
        date: String,
        naps: Vec<NapEntry>,
        total_sleep_hours: String,
        total_sleep_duration: String,
    },
    Empty {
        message: String,
        naps: Vec<NapEntry>,
    },
}

impl DaySummary {
    pub fn naps(&self) -> &[NapEntry] {
        match self {
            Self::Recorded { naps, .. } | Self::Empty { naps, .. } => naps,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub nap_count: u32,
    pub total_sleep_hours: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub nap_count: u32,
    pub total_sleep_hours: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyAveragePoint {
    pub week: String,
    pub days_counted: u8,
    pub avg_naps: f64,
    pub avg_sleep_hours: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub weekly_averages: Vec<WeeklyAveragePoint>,
}
