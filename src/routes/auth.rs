use axum::extract::State;
use axum::Json;

use crate::config::RegistrationMode;
use crate::error::AppError;
use crate::middleware::audit;
use crate::services::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::AuthService;
use crate::routes::ApiJson;
use crate::state::SharedState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    if let Err(retry_after) = state.login_limiter.try_acquire(&req.email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let service = AuthService::new(&state.pool, &state.config.jwt);
    match service.login(&req.email, &req.password).await? {
        Some(response) => {
            state.login_limiter.reset(&req.email);
            tracing::info!(email = %response.email, "User logged in");
            Ok(Json(response))
        }
        None => Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
    }
}

pub async fn register(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is disabled. Contact your administrator.".to_string(),
        ));
    }

    req.validate()?;

    let service = AuthService::new(&state.pool, &state.config.jwt);
    let (user, response) = service
        .register(&req)
        .await?
        .ok_or_else(|| AppError::BadRequest("Email already in use".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.registered",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok(Json(response))
}
