//! Notification broadcast service
//!
//! Fans a message out to every registered subscription of a target user set
//! and prunes endpoints the push service reports as gone. The subscription
//! map is one serialized blob; registration, pruning and removal are
//! read-modify-write passes over it (last writer wins, accepted for this
//! write frequency).

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{PushSubscription, SubscriptionMap},
    services::push::{PushDelivery, PushError},
    store::{keys, KvStore},
};

/// Message delivered to subscribers
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub url: String,
}

#[derive(Clone)]
pub struct BroadcastService {
    store: Arc<dyn KvStore>,
    push: Option<Arc<dyn PushDelivery>>,
    public_key: Option<String>,
}

impl BroadcastService {
    pub fn new(
        store: Arc<dyn KvStore>,
        push: Option<Arc<dyn PushDelivery>>,
        public_key: Option<String>,
    ) -> Self {
        Self {
            store,
            push,
            public_key,
        }
    }

    /// VAPID public key handed to browsers at subscription time
    pub fn public_key(&self) -> AppResult<&str> {
        self.public_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Push credentials are not configured".to_string()))
    }

    async fn load_map(&self) -> AppResult<SubscriptionMap> {
        match self.store.get(keys::SUBSCRIPTIONS).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Internal(format!("Subscription map corrupted: {}", e))),
            None => Ok(SubscriptionMap::new()),
        }
    }

    async fn save_map(&self, map: &SubscriptionMap) -> AppResult<()> {
        let raw = serde_json::to_string(map)
            .map_err(|e| AppError::Internal(format!("Failed to serialize subscription map: {}", e)))?;
        self.store.set(keys::SUBSCRIPTIONS, &raw).await
    }

    /// Register a subscription for a user, replacing any existing entry for
    /// the same endpoint.
    pub async fn subscribe(&self, user: &str, subscription: PushSubscription) -> AppResult<()> {
        let mut map = self.load_map().await?;
        let subs = map.entry(user.to_string()).or_default();
        if let Some(existing) = subs.iter_mut().find(|s| s.endpoint == subscription.endpoint) {
            *existing = subscription;
        } else {
            subs.push(subscription);
        }
        self.save_map(&map).await
    }

    /// Remove one subscription by endpoint. The write is skipped when the
    /// endpoint was not registered.
    pub async fn unsubscribe(&self, user: &str, endpoint: &str) -> AppResult<()> {
        let mut map = self.load_map().await?;
        let Some(subs) = map.get_mut(user) else {
            return Ok(());
        };

        let before = subs.len();
        subs.retain(|s| s.endpoint != endpoint);
        if subs.len() == before {
            return Ok(());
        }
        if subs.is_empty() {
            map.remove(user);
        }
        self.save_map(&map).await
    }

    /// Deliver a message to every subscription of every targeted user except
    /// the excluded one. Delivery is independent per subscription; a failure
    /// never aborts the rest of the fan-out. Returns the count of successful
    /// deliveries.
    ///
    /// Endpoints reported gone (404/410) are removed afterwards in a single
    /// read-modify-write pass; the cleanup write is skipped entirely when
    /// nothing was marked.
    pub async fn broadcast(
        &self,
        users: &[String],
        exclude: Option<&str>,
        payload: &NotificationPayload,
    ) -> AppResult<u64> {
        let push = self
            .push
            .as_ref()
            .ok_or_else(|| AppError::Configuration("Push credentials are not configured".to_string()))?;

        let mut map = self.load_map().await?;
        let body = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize payload: {}", e)))?;

        let mut sent = 0u64;
        let mut stale: Vec<(String, String)> = Vec::new();

        for user in users {
            if exclude == Some(user.as_str()) {
                continue;
            }
            let Some(subs) = map.get(user) else {
                continue;
            };
            for sub in subs {
                match push.send(sub, &body).await {
                    Ok(()) => sent += 1,
                    Err(PushError::Gone) => {
                        tracing::info!("Pruning gone subscription of {}: {}", user, sub.endpoint);
                        stale.push((user.clone(), sub.endpoint.clone()));
                    }
                    Err(PushError::Delivery(e)) => {
                        tracing::warn!("Push delivery to {} failed: {}", user, e);
                    }
                }
            }
        }

        if !stale.is_empty() {
            for (user, endpoint) in &stale {
                if let Some(subs) = map.get_mut(user) {
                    subs.retain(|s| &s.endpoint != endpoint);
                    if subs.is_empty() {
                        map.remove(user);
                    }
                }
            }
            self.save_map(&map).await?;
        }

        Ok(sent)
    }
}
