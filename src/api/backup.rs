//! Dashboard snapshot endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{Snapshot, SnapshotEntry},
};

use super::AdminAuth;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BackupRunQuery {
    /// Whether this run was triggered by the scheduler (default true)
    pub auto: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackupRunResponse {
    /// Calendar day captured, laboratory-local time
    pub date: String,
    /// Snapshots evicted by this run
    pub evicted: u64,
}

/// Capture today's snapshot and evict expired ones.
///
/// Intended to be invoked by an external time-based trigger once daily;
/// running twice on the same date replaces that day's snapshot.
#[utoipa::path(
    post,
    path = "/backup/run",
    tag = "backup",
    params(BackupRunQuery),
    responses(
        (status = 200, description = "Snapshot captured", body = BackupRunResponse),
        (status = 401, description = "Missing or invalid admin secret", body = crate::error::ErrorResponse)
    )
)]
pub async fn run_backup(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
    Query(query): Query<BackupRunQuery>,
) -> AppResult<Json<BackupRunResponse>> {
    let run = state
        .services
        .backup
        .run(query.auto.unwrap_or(true))
        .await?;
    Ok(Json(run))
}

/// List stored snapshots, newest first
#[utoipa::path(
    get,
    path = "/backup/snapshots",
    tag = "backup",
    responses(
        (status = 200, description = "Snapshot index", body = Vec<SnapshotEntry>),
        (status = 401, description = "Missing or invalid admin secret", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_snapshots(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
) -> AppResult<Json<Vec<SnapshotEntry>>> {
    let index = state.services.backup.index().await?;
    Ok(Json(index))
}

/// Fetch one snapshot by date (YYYY-MM-DD)
#[utoipa::path(
    get,
    path = "/backup/snapshots/{date}",
    tag = "backup",
    params(("date" = String, Path, description = "Snapshot date (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Snapshot content", body = Snapshot),
        (status = 404, description = "No snapshot for that date", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_snapshot(
    State(state): State<crate::AppState>,
    _auth: AdminAuth,
    Path(date): Path<String>,
) -> AppResult<Json<Snapshot>> {
    let snapshot = state.services.backup.snapshot(&date).await?;
    Ok(Json(snapshot))
}
