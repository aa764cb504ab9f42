//! Business logic services

pub mod analytics;
pub mod backup;
pub mod broadcast;
pub mod geo;
pub mod push;
pub mod tracker;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, store::KvStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub tracker: tracker::TrackerService,
    pub analytics: analytics::AnalyticsService,
    pub geo: Arc<dyn geo::GeoLookup>,
    pub broadcast: broadcast::BroadcastService,
    pub backup: backup::BackupService,
}

impl Services {
    /// Create all services with the given store. The push signing
    /// credentials are resolved here, once, and handed to the broadcaster.
    pub fn new(store: Arc<dyn KvStore>, config: &AppConfig) -> AppResult<Self> {
        let geo: Arc<dyn geo::GeoLookup> = Arc::new(geo::GeoService::new(&config.geo)?);
        let push = push::WebPushClient::from_config(&config.push)?
            .map(|client| Arc::new(client) as Arc<dyn push::PushDelivery>);

        Ok(Self {
            tracker: tracker::TrackerService::new(store.clone(), geo.clone()),
            analytics: analytics::AnalyticsService::new(store.clone()),
            broadcast: broadcast::BroadcastService::new(
                store.clone(),
                push,
                config.push.vapid_public_key.clone(),
            ),
            backup: backup::BackupService::new(store, config.backup.clone()),
            geo,
        })
    }
}
