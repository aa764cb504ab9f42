//! IP geolocation endpoint

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    services::geo::GeoBatchResult,
};

use super::AdminAuth;

/// Batch lookup request, up to 100 addresses
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GeoLookupRequest {
    #[validate(length(min = 1))]
    pub addresses: Vec<String>,
}

/// Resolve a batch of addresses for reverse display of recent visits
#[utoipa::path(
    post,
    path = "/geo/lookup",
    tag = "geo",
    request_body = GeoLookupRequest,
    responses(
        (status = 200, description = "Per-address geolocation", body = Vec<GeoBatchResult>),
        (status = 401, description = "Missing or invalid admin secret", body = crate::error::ErrorResponse),
        (status = 502, description = "Geolocation provider unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn lookup_batch(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
    Json(request): Json<GeoLookupRequest>,
) -> AppResult<Json<Vec<GeoBatchResult>>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let results = state.services.geo.lookup_batch(&request.addresses).await?;
    Ok(Json(results))
}
