use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::app_settings::SettingsValues;
use crate::error::AppError;
use crate::models::AppSettings;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppSettingsRequest {
    #[serde(default)]
    pub brand_name: String,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
    #[serde(default)]
    pub accent_color: String,
}

impl UpdateAppSettingsRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.required("Brand name", &self.brand_name)
            .length("Brand name", &self.brand_name, 0, 100)
            .hex_color("Primary color", &self.primary_color)
            .hex_color("Secondary color", &self.secondary_color)
            .hex_color("Accent color", &self.accent_color);
        if let Some(logo_url) = &self.logo_url {
            v.length("Logo URL", logo_url, 0, 500);
        }
        v.finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettingsResponse {
    pub id: Uuid,
    pub brand_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub updated_at: DateTime<Utc>,
}

impl From<AppSettings> for AppSettingsResponse {
    fn from(settings: AppSettings) -> Self {
        Self {
            id: settings.id,
            brand_name: settings.brand_name,
            logo_url: settings.logo_url,
            primary_color: settings.primary_color,
            secondary_color: settings.secondary_color,
            accent_color: settings.accent_color,
            updated_at: settings.updated_at,
        }
    }
}

pub struct AppSettingsService<'a> {
    pool: &'a PgPool,
}

impl<'a> AppSettingsService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> Result<Option<AppSettingsResponse>, AppError> {
        let settings = db::app_settings::get(self.pool).await?;
        Ok(settings.map(AppSettingsResponse::from))
    }

    /// Replace every mutable field. Fails with a 400 until the row has been seeded.
    pub async fn update_settings(
        &self,
        req: UpdateAppSettingsRequest,
    ) -> Result<AppSettingsResponse, AppError> {
        let values = SettingsValues {
            brand_name: req.brand_name,
            logo_url: req.logo_url,
            primary_color: req.primary_color,
            secondary_color: req.secondary_color,
            accent_color: req.accent_color,
        };

        db::app_settings::update(self.pool, &values)
            .await?
            .map(AppSettingsResponse::from)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "Settings not found. Run the database seed first.".to_string(),
                )
            })
    }
}
