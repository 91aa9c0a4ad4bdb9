use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchFilter, MatchedProfile};

/// Response for the spin endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinResponse {
    #[serde(rename = "match")]
    pub matched: MatchedProfile,
    #[serde(rename = "whatsappUrl")]
    pub whatsapp_url: String,
    pub filter: MatchFilter,
}

/// Response for avatar uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
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
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
