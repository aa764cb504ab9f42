//! API handlers for Labsite REST endpoints

pub mod analytics;
pub mod backup;
pub mod geo;
pub mod health;
pub mod openapi;
pub mod push;
pub mod track;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{error::AppError, AppState};

/// Header carrying the operator shared secret
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Extractor guarding operator endpoints with the shared admin secret.
/// When no secret is configured, every request is rejected.
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing admin secret header".to_string()))?;

        let expected = state
            .config
            .analytics
            .admin_secret
            .as_deref()
            .ok_or_else(|| AppError::Authentication("Admin secret is not configured".to_string()))?;

        if provided != expected {
            return Err(AppError::Authentication("Invalid admin secret".to_string()));
        }

        Ok(AdminAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::{
            AnalyticsConfig, AppConfig, BackupConfig, GeoConfig, LoggingConfig, PushConfig,
            RedisConfig, ServerConfig,
        },
        services::Services,
        store::MemoryStore,
    };

    fn state_with_secret(secret: Option<&str>) -> AppState {
        let config = AppConfig {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            redis: RedisConfig::default(),
            analytics: AnalyticsConfig {
                admin_secret: secret.map(str::to_string),
            },
            geo: GeoConfig::default(),
            push: PushConfig::default(),
            backup: BackupConfig::default(),
        };
        let services = Services::new(Arc::new(MemoryStore::new()), &config).unwrap();
        AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AdminAuth, AppError> {
        let mut builder = axum::http::Request::builder().uri("/api/v1/analytics");
        if let Some(value) = header {
            builder = builder.header(ADMIN_SECRET_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AdminAuth::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn matching_secret_is_accepted() {
        let state = state_with_secret(Some("s3cret"));
        assert!(extract(&state, Some("s3cret")).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_or_missing_secret_is_rejected() {
        let state = state_with_secret(Some("s3cret"));
        assert!(matches!(
            extract(&state, Some("nope")).await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            extract(&state, None).await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn unconfigured_secret_rejects_everyone() {
        let state = state_with_secret(None);
        assert!(matches!(
            extract(&state, Some("anything")).await,
            Err(AppError::Authentication(_))
        ));
    }
}
