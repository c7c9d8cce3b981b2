use serde::{Deserialize, Serialize};

/// Server-side totals returned by the summary endpoint.
///
/// Always replaced wholesale from the server, never accumulated locally, so it
/// may differ from the locally held image list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_images: u64,
    pub total_size: u64,
    #[serde(alias = "today_uploads")]
    pub today_images: u64,
}

/// Response of the unversioned `/health` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}
