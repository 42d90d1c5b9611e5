//! Response DTOs for the API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::models::vehicle::VehicleDetails;

/// Response body for GET /api/vehicles/search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: u32,
    pub vehicles: Vec<VehicleDetails>,
}

impl SearchPage {
    pub fn new(total_items: usize, page: u32, limit: u32, vehicles: Vec<VehicleDetails>) -> Self {
        Self {
            total_items,
            total_pages: total_items.div_ceil(limit.max(1) as usize),
            current_page: page,
            vehicles,
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub invalidated: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            invalidated: stats.invalidated,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
    pub removed: usize,
}

impl FlushResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cache flushed, {} entries removed", removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_total_pages_rounds_up() {
        assert_eq!(SearchPage::new(21, 1, 10, vec![]).total_pages, 3);
        assert_eq!(SearchPage::new(20, 1, 10, vec![]).total_pages, 2);
        assert_eq!(SearchPage::new(0, 1, 10, vec![]).total_pages, 0);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        for _ in 0..8 {
            stats.record_hit();
        }
        stats.record_miss();
        stats.record_miss();

        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_flush_response_serialize() {
        let json = serde_json::to_string(&FlushResponse::new(3)).unwrap();
        assert!(json.contains("\"removed\":3"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
