use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::config::JwtConfig;
use crate::db;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("Email", &self.email)
            .required("Password", &self.password)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("Name", &self.name)
            .length("Name", &self.name, 3, 200)
            .required("Email", &self.email)
            .email("Email", &self.email)
            .length("Email", &self.email, 0, 200)
            .required("Password", &self.password)
            .length("Password", &self.password, 6, usize::MAX)
            .check(
                self.confirm_password == self.password,
                "Passwords do not match",
            )
            .check(
                self.role != Some(Role::Admin),
                "Self-registration cannot grant the Admin role",
            )
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    /// `None` for root and self-registered accounts.
    pub created_by_id: Option<Uuid>,
}

/// Sign a fresh token for `user`.
pub fn issue_token(user: &User, config: &JwtConfig) -> Result<AuthResponse, AppError> {
    let claims = Claims::for_user(user, config);
    let token = encode_token(&claims, config).map_err(AppError::Internal)?;

    Ok(AuthResponse {
        token,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        expires_at: claims.expires_at(),
        created_by_id: user.created_by_id,
    })
}

pub struct AuthService<'a> {
    pool: &'a PgPool,
    jwt: &'a JwtConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a PgPool, jwt: &'a JwtConfig) -> Self {
        Self { pool, jwt }
    }

    /// `Ok(None)` for a missing user, an inactive user and a wrong password alike.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<AuthResponse>, AppError> {
        let Some(user) = db::users::find_active_by_email(self.pool, email).await? else {
            password::verify_dummy(password);
            return Ok(None);
        };

        let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
        if !valid {
            return Ok(None);
        }

        issue_token(&user, self.jwt).map(Some)
    }

    /// `Ok(None)` when the email is already taken by any account, active or not.
    pub async fn register(&self, req: &RegisterRequest) -> Result<Option<(User, AuthResponse)>, AppError> {
        if db::users::email_exists(self.pool, &req.email).await? {
            return Ok(None);
        }

        let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

        let user = match db::users::create(self.pool, &req.name, &req.email, &pw_hash, Role::User, None)
            .await
        {
            Ok(user) => user,
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                return Ok(None);
            }
            Err(e) => return Err(AppError::Database(e)),
        };

        let response = issue_token(&user, self.jwt)?;
        Ok(Some((user, response)))
    }
}
