use crate::errors::{AppError, TrackerError};
use crate::models::{
    ActiveResponse, ClearDayResponse, CreatedResponse, DateRequest, DaySummary, EndRequest,
    MessageResponse, NapTimesRequest, StartRequest, StatsResponse,
};
use crate::state::AppState;
use crate::timestamps::{self, date_key, parse_date, parse_optional_timestamp, parse_timestamp};
use crate::tracker::SleepTracker;
use crate::ui::render_index;
use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let summary = run(&state, "render index", |tracker| tracker.get_day_summary(None)).await?;
    Ok(Html(render_index(&date_key(timestamps::today()), &summary)))
}

pub async fn start_sleep(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let request: StartRequest = parse_body(&body)?;
    let start_time = parse_optional_timestamp(request.start_time.as_deref())?;

    let id = run(&state, "start sleep", move |tracker| tracker.start(start_time)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Sleep session started".to_string(),
            id,
        }),
    ))
}

pub async fn end_sleep(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: EndRequest = parse_body(&body)?;
    let end_time = parse_optional_timestamp(request.end_time.as_deref())?;
    let sleep_id = request.sleep_id;

    run(&state, "end sleep", move |tracker| tracker.end(sleep_id, end_time)).await?;
    Ok(message("Sleep session ended"))
}

pub async fn get_summary(
    State(state): State<AppState>,
    query: Result<Query<DateRequest>, QueryRejection>,
) -> Result<Json<DaySummary>, AppError> {
    let Query(query) = query.map_err(|err| AppError::bad_request(err.body_text()))?;
    let date = optional_date(query.date.as_deref())?;

    let summary = run(&state, "get summary", move |tracker| tracker.get_day_summary(date)).await?;
    Ok(Json(summary))
}

pub async fn get_active(State(state): State<AppState>) -> Result<Json<ActiveResponse>, AppError> {
    let active_session = run(&state, "check active session", |tracker| {
        tracker.get_active_session()
    })
    .await?;
    Ok(Json(ActiveResponse { active_session }))
}

pub async fn add_manual_nap(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let request: NapTimesRequest = parse_body(&body)?;
    let (Some(start), Some(end)) = (
        non_blank(request.start_time.as_deref()),
        non_blank(request.end_time.as_deref()),
    )
    else {
        return Err(TrackerError::MissingTimes.into());
    };
    let start_time = parse_timestamp(start)?;
    let end_time = parse_timestamp(end)?;

    let id = run(&state, "add manual nap", move |tracker| {
        tracker.add_manual_nap(start_time, end_time)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Manual nap added".to_string(),
            id,
        }),
    ))
}

pub async fn delete_nap(
    State(state): State<AppState>,
    nap_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(nap_id) = nap_id.map_err(|err| AppError::bad_request(err.body_text()))?;

    run(&state, "delete nap", move |tracker| tracker.delete_nap(nap_id)).await?;
    Ok(message("Nap deleted successfully"))
}

pub async fn update_nap(
    State(state): State<AppState>,
    nap_id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(nap_id) = nap_id.map_err(|err| AppError::bad_request(err.body_text()))?;
    let request: NapTimesRequest = parse_body(&body)?;
    let start_time = parse_optional_timestamp(request.start_time.as_deref())?;
    let end_time = parse_optional_timestamp(request.end_time.as_deref())?;

    run(&state, "update nap", move |tracker| {
        tracker.update_nap(nap_id, start_time, end_time)
    })
    .await?;
    Ok(message("Nap updated successfully"))
}

pub async fn clear_day(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClearDayResponse>, AppError> {
    let request: DateRequest = parse_body(&body)?;
    let date = optional_date(request.date.as_deref())?.unwrap_or_else(timestamps::today);

    let records_deleted =
        run(&state, "clear day", move |tracker| tracker.clear_day_data(Some(date))).await?;
    Ok(Json(ClearDayResponse {
        message: format!("Cleared sleep data for {}", date_key(date)),
        records_deleted,
    }))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let today = timestamps::today();
    let stats = run(&state, "get stats", move |tracker| tracker.weekly_stats(today)).await?;
    Ok(Json(stats))
}

/// Runs a tracker call off the async runtime, logging any failure.
async fn run<T, F>(state: &AppState, operation: &'static str, call: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&SleepTracker) -> Result<T, TrackerError> + Send + 'static,
{
    let tracker = Arc::clone(&state.tracker);
    let result = tokio::task::spawn_blocking(move || call(tracker.as_ref())).await?;
    result.map_err(|err| {
        warn!("error during {operation}: {err}");
        AppError::from(err)
    })
}

/// An empty body stands for a request with every field omitted.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid JSON body: {err}")))
}

fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, TrackerError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(parse_date)
        .transpose()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_all_fields_absent() {
        let request: EndRequest = parse_body(b"").unwrap();
        assert!(request.sleep_id.is_none());
        assert!(request.end_time.is_none());
        let request: StartRequest = parse_body(b" \n").unwrap();
        assert!(request.start_time.is_none());
    }

    #[test]
    fn null_fields_are_absent() {
        let request: EndRequest = parse_body(br#"{"sleep_id": null, "end_time": null}"#).unwrap();
        assert!(request.sleep_id.is_none());
        assert!(request.end_time.is_none());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_body::<StartRequest>(b"{not json").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_date_falls_back_to_default() {
        assert!(optional_date(Some("  ")).unwrap().is_none());
        assert!(optional_date(None).unwrap().is_none());
        assert!(optional_date(Some("2024-02-30")).is_err());
    }
}
