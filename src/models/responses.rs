use serde::{Deserialize, Serialize};

/// Response for packet generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketResponse {
    pub message: String,
    pub filepath: String,
    pub filename: String,
    pub format: String,
    pub download_url: String,
}

/// Response for catalog seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
