use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Singleton open/closed flag for the storefront. A missing document means
/// the app is open — never block customers because the flag was never set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppStatus {
    pub is_open: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AppStatus {
    fn default() -> Self {
        AppStatus {
            is_open: true,
            message: String::new(),
            updated_by: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetAppStatusRequest {
    pub is_open: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_open() {
        let status = AppStatus::default();
        assert!(status.is_open);
        assert!(status.message.is_empty());
    }
}
