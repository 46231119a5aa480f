use axum::http::StatusCode;
use axum::Json;
use thiserror::Error;

/// Failures raised by the sleep tracker service.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("No active sleep session found")]
    NoActiveSession,

    #[error("No nap found with ID {0}")]
    NapNotFound(i64),

    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("Both start_time and end_time are required")]
    MissingTimes,

    #[error("invalid time '{value}', expected YYYY-MM-DD HH:MM")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl TrackerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoActiveSession | Self::NapNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EndNotAfterStart
                | Self::MissingTimes
                | Self::InvalidTimestamp { .. }
                | Self::InvalidDate { .. }
        )
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

// Every tracker failure is reported the same way, whatever its kind.
impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
