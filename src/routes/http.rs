//! HTTP endpoint handlers. Thin wrappers around the store.
//! Each handler is instrumented and logs its parameters and basic result info.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::protocol::{DailyProblemsOut, HealthOut};
use crate::state::AppState;
use crate::util::parse_path_date;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
    Json(HealthOut { ok: true })
}

/// `GET /problems/date/:date` with `date` as `MM-DD-YYYY`.
#[instrument(level = "info", skip(state))]
pub async fn http_get_daily_problems(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyProblemsOut>, ApiError> {
    let day = parse_path_date(&date).inspect_err(|_| {
        info!(target: "daily_problems", %date, "Rejected malformed date");
    })?;
    let problems = state.store.get_daily_problems(day).await?;
    info!(target: "daily_problems", %day, absent = ?problems.absent(), "HTTP daily problems served");
    Ok(Json(DailyProblemsOut { problems }))
}
