use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_BRAND_NAME: &str = "Base API";
pub const DEFAULT_PRIMARY_COLOR: &str = "#3B82F6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#8B5CF6";
pub const DEFAULT_ACCENT_COLOR: &str = "#22C55E";

/// White-label branding. At most one row exists.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub id: Uuid,
    pub brand_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
