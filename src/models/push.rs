//! Push subscription model

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Encryption keys of a browser push subscription. Opaque to this system;
/// passed through to the push service untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// One browser endpoint registered to receive notifications for one user.
/// The endpoint URL is the unique identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Mapping from user identifier to that user's registered subscriptions,
/// persisted as one serialized blob under a single key.
pub type SubscriptionMap = HashMap<String, Vec<PushSubscription>>;
