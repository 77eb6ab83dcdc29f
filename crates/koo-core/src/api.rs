//! JSON envelopes shared by the server and the remote client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{ success, data, timestamp }` listing envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    /// Search term, present on search responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response stamped now
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            query: None,
        }
    }

    /// With echoed search term
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Daily recommendation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse<T> {
    pub success: bool,
    /// `null` when nothing can be recommended
    pub data: Option<T>,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `/health` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"`
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
}

impl HealthResponse {
    #[must_use]
    pub fn ok(uptime: f64) -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: Utc::now(),
            uptime,
        }
    }
}

/// Error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BusinessRecord;

    #[test]
    fn listing_envelope_shape() {
        let response = ApiResponse::ok(vec![BusinessRecord::default()]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["data"].is_array());
        assert!(json["timestamp"].is_string());
        assert!(json.get("query").is_none());

        let json = serde_json::to_value(response.with_query("aly")).unwrap();
        assert_eq!(json["query"], "aly");
    }

    #[test]
    fn health_shape() {
        let json = serde_json::to_value(HealthResponse::ok(1.5)).unwrap();
        assert_eq!(json["status"], "OK");
        assert_eq!(json["uptime"], 1.5);
    }

    #[test]
    fn empty_recommendation_serializes_null() {
        let response: RecommendationResponse<BusinessRecord> = RecommendationResponse {
            success: true,
            data: None,
            date: "2025-03-01".to_string(),
            message: Some("No hay negocios disponibles para recomendar hoy.".to_string()),
        };
        let json = serde_json::to_value(response).unwrap();
        assert!(json["data"].is_null());
    }
}
