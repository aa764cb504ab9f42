//! IP geolocation service
//!
//! Thin client over the ip-api style geolocation provider. Single-address
//! mode is used inline during visit tracking and must never fail the caller;
//! batch mode (up to 100 addresses per request) backs the reverse display of
//! recent-visit addresses on the dashboard.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::GeoConfig,
    error::{AppError, AppResult},
};

/// Largest batch the provider accepts in one request
pub const MAX_BATCH: usize = 100;

/// Coarse geolocation of one address
#[derive(Debug, Clone)]
pub struct GeoInfo {
    pub country: String,
    pub city: String,
    pub region: String,
}

impl GeoInfo {
    /// Fallback value used whenever resolution fails
    pub fn unknown() -> Self {
        Self {
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            region: "Unknown".to_string(),
        }
    }
}

/// Per-address result of a batch lookup
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeoBatchResult {
    /// The address that was looked up
    pub query: String,
    /// "success" or "fail", as reported by the provider
    pub status: String,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Wire shape of the provider's per-address answer
#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    status: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    query: Option<String>,
}

/// Geolocation lookup interface
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GeoLookup: Send + Sync {
    /// Resolve one address. Infallible: any lookup failure yields the
    /// Unknown fallback.
    async fn lookup(&self, addr: &str) -> GeoInfo;

    /// Resolve a batch of addresses (capped at [`MAX_BATCH`]).
    async fn lookup_batch(&self, addrs: &[String]) -> AppResult<Vec<GeoBatchResult>>;
}

#[derive(Clone)]
pub struct GeoService {
    http: reqwest::Client,
    endpoint: String,
}

impl GeoService {
    pub fn new(config: &GeoConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_single(&self, addr: &str) -> Result<GeoApiResponse, reqwest::Error> {
        let url = format!(
            "{}/json/{}?fields=status,country,countryCode,city,regionName",
            self.endpoint, addr
        );
        self.http.get(url).send().await?.json::<GeoApiResponse>().await
    }
}

#[async_trait::async_trait]
impl GeoLookup for GeoService {
    async fn lookup(&self, addr: &str) -> GeoInfo {
        if addr.is_empty() || addr == "unknown" {
            return GeoInfo::unknown();
        }

        match self.fetch_single(addr).await {
            Ok(response) if response.status.as_deref() == Some("success") => GeoInfo {
                country: response.country.unwrap_or_else(|| "Unknown".to_string()),
                city: response.city.unwrap_or_else(|| "Unknown".to_string()),
                region: response.region_name.unwrap_or_else(|| "Unknown".to_string()),
            },
            Ok(_) => GeoInfo::unknown(),
            Err(e) => {
                tracing::warn!("Geolocation lookup failed for {}: {}", addr, e);
                GeoInfo::unknown()
            }
        }
    }

    async fn lookup_batch(&self, addrs: &[String]) -> AppResult<Vec<GeoBatchResult>> {
        let batch = &addrs[..addrs.len().min(MAX_BATCH)];
        if batch.len() < addrs.len() {
            tracing::warn!(
                "Geolocation batch truncated from {} to {} addresses",
                addrs.len(),
                MAX_BATCH
            );
        }

        let url = format!(
            "{}/batch?fields=status,country,countryCode,city,regionName,query",
            self.endpoint
        );
        let responses: Vec<GeoApiResponse> = self
            .http
            .post(url)
            .json(&batch)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Geolocation batch request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Geolocation batch response malformed: {}", e)))?;

        Ok(responses
            .into_iter()
            .map(|r| GeoBatchResult {
                query: r.query.unwrap_or_default(),
                status: r.status.unwrap_or_else(|| "fail".to_string()),
                country: r.country,
                country_code: r.country_code,
                city: r.city,
                region: r.region_name,
            })
            .collect())
    }
}
