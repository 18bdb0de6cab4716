use sqlx::PgPool;

use crate::models::app_settings::{
    DEFAULT_ACCENT_COLOR, DEFAULT_BRAND_NAME, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
};
use crate::models::AppSettings;

/// Replacement values for every mutable column.
#[derive(Debug, Clone)]
pub struct SettingsValues {
    pub brand_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

pub async fn get(pool: &PgPool) -> Result<Option<AppSettings>, sqlx::Error> {
    sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings LIMIT 1")
        .fetch_optional(pool)
        .await
}

/// Insert the default row unless one exists. Returns whether a row was created.
pub async fn seed_default(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO app_settings (brand_name, primary_color, secondary_color, accent_color)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (singleton) DO NOTHING",
    )
    .bind(DEFAULT_BRAND_NAME)
    .bind(DEFAULT_PRIMARY_COLOR)
    .bind(DEFAULT_SECONDARY_COLOR)
    .bind(DEFAULT_ACCENT_COLOR)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Overwrite the singleton row. Returns `None` when it has not been seeded.
pub async fn update(
    pool: &PgPool,
    values: &SettingsValues,
) -> Result<Option<AppSettings>, sqlx::Error> {
    sqlx::query_as::<_, AppSettings>(
        "UPDATE app_settings SET
            brand_name = $1,
            logo_url = $2,
            primary_color = $3,
            secondary_color = $4,
            accent_color = $5,
            updated_at = now()
         WHERE singleton RETURNING *",
    )
    .bind(&values.brand_name)
    .bind(values.logo_url.as_deref())
    .bind(&values.primary_color)
    .bind(&values.secondary_color)
    .bind(&values.accent_color)
    .fetch_optional(pool)
    .await
}
