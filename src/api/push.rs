//! Push notification endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::PushSubscription,
    services::broadcast::NotificationPayload,
};

use super::AdminAuth;

#[derive(Serialize, ToSchema)]
pub struct PublicKeyResponse {
    /// Base64url-encoded VAPID public key
    pub key: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    /// User identifier owning the subscription
    #[validate(length(min = 1))]
    pub user: String,
    pub subscription: PushSubscription,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnsubscribeRequest {
    #[validate(length(min = 1))]
    pub user: String,
    /// Endpoint URL of the subscription to remove
    #[validate(length(min = 1))]
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BroadcastRequest {
    /// Target user identifiers
    #[validate(length(min = 1))]
    pub users: Vec<String>,
    #[validate(length(min = 1))]
    pub title: String,
    pub body: Option<String>,
    pub tag: Option<String>,
    pub url: Option<String>,
    /// User left out of the broadcast (the actor who triggered the event)
    pub exclude: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BroadcastResponse {
    /// Count of successful deliveries
    pub sent: u64,
}

#[derive(Serialize, ToSchema)]
pub struct AckResponse {
    pub ok: bool,
}

/// VAPID public key for browser registration
#[utoipa::path(
    get,
    path = "/push/public-key",
    tag = "push",
    responses(
        (status = 200, description = "Public key", body = PublicKeyResponse),
        (status = 503, description = "Push credentials not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn public_key(
    State(state): State<crate::AppState>,
) -> AppResult<Json<PublicKeyResponse>> {
    let key = state.services.broadcast.public_key()?;
    Ok(Json(PublicKeyResponse {
        key: key.to_string(),
    }))
}

/// Register a push subscription for a user
#[utoipa::path(
    post,
    path = "/push/subscribe",
    tag = "push",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription stored", body = AckResponse)
    )
)]
pub async fn subscribe(
    State(state): State<crate::AppState>,
    Json(request): Json<SubscribeRequest>,
) -> AppResult<Json<AckResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .broadcast
        .subscribe(&request.user, request.subscription)
        .await?;
    Ok(Json(AckResponse { ok: true }))
}

/// Remove a push subscription
#[utoipa::path(
    post,
    path = "/push/unsubscribe",
    tag = "push",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Subscription removed", body = AckResponse)
    )
)]
pub async fn unsubscribe(
    State(state): State<crate::AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> AppResult<Json<AckResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .broadcast
        .unsubscribe(&request.user, &request.endpoint)
        .await?;
    Ok(Json(AckResponse { ok: true }))
}

/// Broadcast a notification to a set of users
#[utoipa::path(
    post,
    path = "/push/broadcast",
    tag = "push",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Broadcast attempted", body = BroadcastResponse),
        (status = 401, description = "Missing or invalid admin secret", body = crate::error::ErrorResponse),
        (status = 503, description = "Push credentials not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn broadcast(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
    Json(request): Json<BroadcastRequest>,
) -> AppResult<Json<BroadcastResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let payload = NotificationPayload {
        title: request.title,
        body: request.body.unwrap_or_default(),
        tag: request.tag.unwrap_or_else(|| "labsite".to_string()),
        url: request.url.unwrap_or_else(|| "/".to_string()),
    };

    let sent = state
        .services
        .broadcast
        .broadcast(&request.users, request.exclude.as_deref(), &payload)
        .await?;
    Ok(Json(BroadcastResponse { sent }))
}
