//! Report submission and history routes

use crate::error::ApiError;
use crate::models::{HistoryQuery, SubmitReportResponse};
use crate::{view, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use qg_core::Report;
use std::sync::Arc;
use tracing::debug;

pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Report>, JsonRejection>,
) -> Result<Json<SubmitReportResponse>, ApiError> {
    let Json(report) = payload?;

    let submission = state.gate.submit(&report).await?;

    Ok(Json(submission.into()))
}

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let rows = state.gate.history(&user).await?;
    debug!("Found {} reports for user {}", rows.len(), user);

    if rows.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("No reports found for user {}", user),
        )
            .into_response());
    }

    let format = query.format.unwrap_or_else(|| "html".to_string());
    let response = match format.as_str() {
        "json" => Json(rows).into_response(),
        _ => Html(view::render_history(&user, &rows)).into_response(),
    };

    Ok(response)
}
