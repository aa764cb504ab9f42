//! Visit analytics service

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    api::analytics::{AnalyticsResponse, DailyCount},
    error::AppResult,
    models::VisitRecord,
    services::tracker::RECENT_LOG_CAP,
    store::{keys, KvStore},
};

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn KvStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Produce the time-windowed summary for the last `period_days` days.
    ///
    /// The period country breakdown is recomputed from the capped recent
    /// log, so it undercounts once the window holds more visits than the
    /// log; the per-day series is read from its own counters and is the
    /// accurate period total.
    pub async fn summary(&self, period_days: i64) -> AppResult<AnalyticsResponse> {
        let period_days = period_days.clamp(1, 365);

        let total = self
            .store
            .get(keys::TOTAL_VISITS)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        let countries_all_time: HashMap<String, i64> = self
            .store
            .hgetall(keys::COUNTRY_VISITS)
            .await?
            .into_iter()
            .map(|(country, count)| (country, count.parse::<i64>().unwrap_or(0)))
            .collect();

        let today = Utc::now().date_naive();
        let cutoff = today - Duration::days(period_days);

        let recent: Vec<VisitRecord> = self
            .store
            .lrange(keys::RECENT_VISITS, 0, RECENT_LOG_CAP as isize - 1)
            .await?
            .iter()
            .filter_map(|raw| match serde_json::from_str::<VisitRecord>(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Discarding malformed visit record: {}", e);
                    None
                }
            })
            .filter(|record| record.timestamp.date_naive() >= cutoff)
            .collect();

        let mut countries: HashMap<String, i64> = HashMap::new();
        for record in &recent {
            *countries.entry(record.country.clone()).or_insert(0) += 1;
        }

        // One read per day in the window, zero-filled, oldest first
        let mut daily = Vec::with_capacity(period_days as usize);
        for offset in (0..period_days).rev() {
            let date = today - Duration::days(offset);
            let day = date.format("%Y-%m-%d").to_string();
            let count = self
                .store
                .get(&keys::daily_visits(&day))
                .await?
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0);
            daily.push(DailyCount { date: day, count });
        }
        let period_total = daily.iter().map(|d| d.count).sum();

        Ok(AnalyticsResponse {
            total,
            period_days,
            period_total,
            daily,
            countries,
            countries_all_time,
            recent,
        })
    }
}
