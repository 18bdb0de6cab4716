use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use crate::auth::jwt::{self, Claims};
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

/// Identity proven by a valid bearer token. No database access.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub claims: Claims,
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let claims = jwt::decode_token(bearer.token(), &state.config.jwt).map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            claims,
        })
    }
}

/// The authenticated account as currently stored.
///
/// Rejects with 401 when the token's subject no longer exists or has been
/// deactivated since the token was issued.
#[derive(Debug, Clone)]
pub struct Actor(pub User);

impl Actor {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn id(&self) -> Uuid {
        self.0.id
    }

    /// Role checks use the stored role, so demotions apply to live tokens.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let user = db::users::find_active_by_id(&state.pool, auth.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account not found or inactive".to_string()))?;

        Ok(Actor(user))
    }
}
