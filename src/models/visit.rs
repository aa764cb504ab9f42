//! Visit record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One observed page load.
///
/// The stored address is an irreversibly truncated prefix of the client
/// address; the full address is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitRecord {
    /// Truncated client address (privacy-redacted)
    pub addr: String,
    /// Resolved country, "Unknown" when the lookup fails
    pub country: String,
    pub city: String,
    pub region: String,
    /// Time of the visit, UTC
    pub timestamp: DateTime<Utc>,
    /// User-agent string, capped at 100 characters
    pub user_agent: String,
}
