//! Visit tracking service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::VisitRecord,
    services::geo::GeoLookup,
    store::{keys, KvStore},
};

/// Newest entries kept in the recent-visit log
pub const RECENT_LOG_CAP: usize = 100;

/// Longest user-agent string persisted with a visit
const USER_AGENT_CAP: usize = 100;

/// Resolve the client address from forwarding headers: first entry of the
/// forwarded-for chain, then the real-ip header, then a literal "unknown".
pub fn client_addr(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(|addr| addr.trim())
        .filter(|addr| !addr.is_empty())
        .or_else(|| real_ip.map(|addr| addr.trim()).filter(|addr| !addr.is_empty()))
        .unwrap_or("unknown")
        .to_string()
}

/// Irreversibly truncate a client address before persistence. Only a short
/// prefix survives; the remainder is discarded, never stored.
pub fn truncate_addr(addr: &str) -> String {
    let octets: Vec<&str> = addr.split('.').collect();
    if octets.len() == 4 {
        return format!("{}.{}.x.x", octets[0], octets[1]);
    }
    if addr.contains(':') {
        let mut groups = addr.split(':');
        let first = groups.next().unwrap_or("");
        let second = groups.next().unwrap_or("");
        return format!("{}:{}::", first, second);
    }
    addr.chars().take(8).collect()
}

#[derive(Clone)]
pub struct TrackerService {
    store: Arc<dyn KvStore>,
    geo: Arc<dyn GeoLookup>,
}

impl TrackerService {
    pub fn new(store: Arc<dyn KvStore>, geo: Arc<dyn GeoLookup>) -> Self {
        Self { store, geo }
    }

    /// Record one visit: resolve coarse geolocation, then update the total,
    /// per-day and per-country counters and the capped recent-visit log.
    ///
    /// The writes are sequential and independent; a failure partway leaves
    /// the earlier counters updated (the counters are approximate analytics,
    /// not accounting). Geolocation failure never fails the operation.
    pub async fn track(
        &self,
        forwarded_for: Option<&str>,
        real_ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<()> {
        let addr = client_addr(forwarded_for, real_ip);
        let geo = self.geo.lookup(&addr).await;

        let record = VisitRecord {
            addr: truncate_addr(&addr),
            country: geo.country,
            city: geo.city,
            region: geo.region,
            timestamp: Utc::now(),
            user_agent: user_agent
                .unwrap_or("")
                .chars()
                .take(USER_AGENT_CAP)
                .collect(),
        };

        self.store.incr(keys::TOTAL_VISITS).await?;

        let day = record.timestamp.date_naive().format("%Y-%m-%d").to_string();
        self.store.incr(&keys::daily_visits(&day)).await?;

        self.store.hincr(keys::COUNTRY_VISITS, &record.country).await?;

        let serialized = serde_json::to_string(&record)
            .map_err(|e| AppError::Internal(format!("Failed to serialize visit record: {}", e)))?;
        self.store.lpush(keys::RECENT_VISITS, &serialized).await?;
        self.store
            .ltrim(keys::RECENT_VISITS, 0, RECENT_LOG_CAP as isize - 1)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geo::{GeoInfo, MockGeoLookup};
    use crate::store::MemoryStore;

    fn unknown_geo() -> Arc<MockGeoLookup> {
        let mut geo = MockGeoLookup::new();
        geo.expect_lookup().returning(|_| GeoInfo::unknown());
        Arc::new(geo)
    }

    #[test]
    fn client_addr_takes_first_forwarded_entry() {
        assert_eq!(
            client_addr(Some("203.0.113.9, 10.0.0.1, 10.0.0.2"), Some("10.0.0.3")),
            "203.0.113.9"
        );
        assert_eq!(client_addr(None, Some("198.51.100.7")), "198.51.100.7");
        assert_eq!(client_addr(None, None), "unknown");
        assert_eq!(client_addr(Some(""), None), "unknown");
    }

    #[test]
    fn truncation_never_preserves_the_full_address() {
        for addr in ["203.0.113.94", "198.51.100.7", "2001:db8:85a3::8a2e:370:7334"] {
            let stored = truncate_addr(addr);
            assert!(!stored.contains(addr), "{} leaked into {}", addr, stored);
        }
        assert_eq!(truncate_addr("203.0.113.94"), "203.0.x.x");
        assert_eq!(truncate_addr("2001:db8:85a3::1"), "2001:db8::");
    }

    #[tokio::test]
    async fn track_updates_every_counter() {
        let store = Arc::new(MemoryStore::new());
        let tracker = TrackerService::new(store.clone(), unknown_geo());

        for _ in 0..3 {
            tracker
                .track(Some("203.0.113.9"), None, Some("test-agent"))
                .await
                .unwrap();
        }

        assert_eq!(
            store.get(keys::TOTAL_VISITS).await.unwrap(),
            Some("3".to_string())
        );
        let day = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(
            store.get(&keys::daily_visits(&day)).await.unwrap(),
            Some("3".to_string())
        );
        let countries = store.hgetall(keys::COUNTRY_VISITS).await.unwrap();
        assert_eq!(countries.get("Unknown"), Some(&"3".to_string()));
    }

    #[tokio::test]
    async fn recent_log_never_exceeds_the_cap() {
        let store = Arc::new(MemoryStore::new());
        let tracker = TrackerService::new(store.clone(), unknown_geo());

        for _ in 0..RECENT_LOG_CAP + 5 {
            tracker.track(Some("203.0.113.9"), None, None).await.unwrap();
        }

        let log = store.lrange(keys::RECENT_VISITS, 0, -1).await.unwrap();
        assert_eq!(log.len(), RECENT_LOG_CAP);
    }

    #[tokio::test]
    async fn stored_record_is_redacted_and_capped() {
        let store = Arc::new(MemoryStore::new());
        let tracker = TrackerService::new(store.clone(), unknown_geo());

        let long_agent = "a".repeat(300);
        tracker
            .track(Some("203.0.113.94"), None, Some(&long_agent))
            .await
            .unwrap();

        let log = store.lrange(keys::RECENT_VISITS, 0, -1).await.unwrap();
        let record: VisitRecord = serde_json::from_str(&log[0]).unwrap();
        assert!(!log[0].contains("203.0.113.94"));
        assert_eq!(record.addr, "203.0.x.x");
        assert_eq!(record.user_agent.len(), 100);
    }

    #[tokio::test]
    async fn geolocation_outcome_does_not_change_counting() {
        let mut geo = MockGeoLookup::new();
        geo.expect_lookup().returning(|_| GeoInfo {
            country: "Japan".to_string(),
            city: "Sendai".to_string(),
            region: "Miyagi".to_string(),
        });
        let store = Arc::new(MemoryStore::new());
        let tracker = TrackerService::new(store.clone(), Arc::new(geo));

        tracker.track(Some("203.0.113.9"), None, None).await.unwrap();

        assert_eq!(
            store.get(keys::TOTAL_VISITS).await.unwrap(),
            Some("1".to_string())
        );
        let countries = store.hgetall(keys::COUNTRY_VISITS).await.unwrap();
        assert_eq!(countries.get("Japan"), Some(&"1".to_string()));
    }
}
