use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub configured: bool,
    pub profiles: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MetricsResponse {
    pub responses: u64,
    pub resolution_errors: u64,
    pub nonces_issued: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: String,
}
