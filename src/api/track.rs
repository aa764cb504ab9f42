//! Visit tracking endpoint

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Serialize, ToSchema)]
pub struct TrackResponse {
    pub ok: bool,
}

/// Record one visit.
///
/// The caller is responsible for at-most-once-per-session invocation; every
/// request counts as a new visit event.
#[utoipa::path(
    post,
    path = "/track",
    tag = "analytics",
    responses(
        (status = 200, description = "Visit recorded", body = TrackResponse)
    )
)]
pub async fn track(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TrackResponse>> {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok());

    state
        .services
        .tracker
        .track(forwarded_for, real_ip, user_agent)
        .await?;

    Ok(Json(TrackResponse { ok: true }))
}
