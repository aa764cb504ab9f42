//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{analytics, backup, geo, health, push, track};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labsite API",
        version = "1.0.0",
        description = "Research Laboratory Website Backend REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Labsite Team", email = "contact@labsite.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Analytics
        track::track,
        analytics::get_analytics,
        // Geolocation
        geo::lookup_batch,
        // Push
        push::public_key,
        push::subscribe,
        push::unsubscribe,
        push::broadcast,
        // Backup
        backup::run_backup,
        backup::list_snapshots,
        backup::get_snapshot,
    ),
    components(
        schemas(
            // Analytics
            track::TrackResponse,
            analytics::AnalyticsQuery,
            analytics::AnalyticsResponse,
            analytics::DailyCount,
            crate::models::visit::VisitRecord,
            // Geolocation
            geo::GeoLookupRequest,
            crate::services::geo::GeoBatchResult,
            // Push
            push::PublicKeyResponse,
            push::SubscribeRequest,
            push::UnsubscribeRequest,
            push::BroadcastRequest,
            push::BroadcastResponse,
            push::AckResponse,
            crate::models::push::PushSubscription,
            crate::models::push::SubscriptionKeys,
            // Backup
            backup::BackupRunQuery,
            backup::BackupRunResponse,
            crate::models::snapshot::Snapshot,
            crate::models::snapshot::SnapshotEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "analytics", description = "Visit tracking and analytics"),
        (name = "geo", description = "IP geolocation lookups"),
        (name = "push", description = "Web-push subscriptions and broadcasts"),
        (name = "backup", description = "Dashboard snapshots")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
