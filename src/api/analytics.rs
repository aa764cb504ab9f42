//! Visit analytics endpoint

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::VisitRecord};

use super::AdminAuth;

/// Query parameters for the analytics summary
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AnalyticsQuery {
    /// Window size in days (default 7)
    pub period: Option<i64>,
}

/// Visits recorded on one calendar day
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyCount {
    /// Calendar date (YYYY-MM-DD, UTC)
    pub date: String,
    pub count: i64,
}

/// Time-windowed visit summary
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    /// All-time visit count
    pub total: i64,
    /// Window size actually applied
    pub period_days: i64,
    /// Sum of the per-day counters in the window
    pub period_total: i64,
    /// Per-day counts, zero-filled, oldest first
    pub daily: Vec<DailyCount>,
    /// Per-country counts within the window, recomputed from the capped
    /// recent-visit log (may undercount busy windows)
    pub countries: HashMap<String, i64>,
    /// All-time per-country counts
    pub countries_all_time: HashMap<String, i64>,
    /// Recent visits within the window, newest first
    pub recent: Vec<VisitRecord>,
}

/// Windowed analytics summary
#[utoipa::path(
    get,
    path = "/analytics",
    tag = "analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Visit summary", body = AnalyticsResponse),
        (status = 401, description = "Missing or invalid admin secret", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_analytics(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsResponse>> {
    let summary = state
        .services
        .analytics
        .summary(query.period.unwrap_or(7))
        .await?;
    Ok(Json(summary))
}
