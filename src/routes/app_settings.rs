use axum::extract::State;
use axum::Json;

use crate::auth::extractor::Actor;
use crate::auth::policy;
use crate::error::AppError;
use crate::middleware::audit;
use crate::services::app_settings::{AppSettingsResponse, UpdateAppSettingsRequest};
use crate::services::AppSettingsService;
use crate::routes::ApiJson;
use crate::state::SharedState;

pub async fn get_settings(
    State(state): State<SharedState>,
) -> Result<Json<AppSettingsResponse>, AppError> {
    let settings = AppSettingsService::new(&state.pool)
        .get_settings()
        .await?
        .ok_or_else(|| AppError::NotFound("Settings not found".to_string()))?;
    Ok(Json(settings))
}

pub async fn update_settings(
    actor: Actor,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<UpdateAppSettingsRequest>,
) -> Result<Json<AppSettingsResponse>, AppError> {
    actor.require_admin()?;
    policy::can_manage_settings(actor.user()).into_result()?;
    req.validate()?;

    let updated = AppSettingsService::new(&state.pool)
        .update_settings(req)
        .await?;

    audit::log_event(
        &state.pool,
        Some(actor.id()),
        "settings.updated",
        "app_settings",
        Some(updated.id),
        None,
    )
    .await;

    Ok(Json(updated))
}
