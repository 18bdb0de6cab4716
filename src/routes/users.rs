use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::Actor;
use crate::auth::password;
use crate::auth::policy::{self, ListingScope};
use crate::db;
use crate::db::users::UserChanges;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Role, User};
use crate::routes::{ApiJson, ApiPath};
use crate::state::SharedState;
use crate::validation::Validator;

#[derive(Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

impl CreateUser {
    fn validate(&self) -> Result<(), AppError> {
        Validator::new()
            .required("Name", &self.name)
            .length("Name", &self.name, 0, 200)
            .required("Email", &self.email)
            .email("Email", &self.email)
            .length("Email", &self.email, 0, 200)
            .required("Password", &self.password)
            .length("Password", &self.password, 6, 100)
            .check(self.role.is_some(), "Role is required")
            .finish()
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.length("Name", name, 3, 200);
        }
        if let Some(email) = &self.email {
            v.required("Email", email).email("Email", email).length("Email", email, 0, 200);
        }
        if let Some(password) = &self.password {
            v.length("Password", password, 6, 100);
        }
        v.finish()
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("password", self.password.is_some()),
            ("role", self.role.is_some()),
            ("isActive", self.is_active.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

/// Active users visible to the calling admin.
pub async fn list(
    actor: Actor,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    actor.require_admin()?;

    let users = match policy::listing_scope(actor.user()) {
        ListingScope::AllExcept(id) => db::users::list_active_except(&state.pool, id).await?,
        ListingScope::CreatedBy(id) => db::users::list_active_created_by(&state.pool, id).await?,
    };
    Ok(Json(users))
}

pub async fn list_inactive(
    _actor: Actor,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = db::users::list_inactive(&state.pool).await?;
    Ok(Json(users))
}

pub async fn get(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<CreateUser>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_admin()?;
    req.validate()?;

    if db::users::email_exists(&state.pool, &req.email).await? {
        return Err(AppError::BadRequest("Email already in use".to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let role = req.role.unwrap_or(Role::User);

    let user = db::users::create(
        &state.pool,
        &req.name,
        &req.email,
        &pw_hash,
        role,
        Some(actor.id()),
    )
    .await
    .map_err(AppError::from_email_conflict)?;

    tracing::info!(user_id = %user.id, %role, created_by = %actor.id(), "User created");

    audit::log_event(
        &state.pool,
        Some(actor.id()),
        "user.created",
        "user",
        Some(user.id),
        Some(serde_json::json!({ "role": role })),
    )
    .await;

    let location = format!("/api/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(user),
    ))
}

pub async fn update(
    actor: Actor,
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUser>,
) -> Result<Json<User>, AppError> {
    actor.require_admin()?;
    req.validate()?;

    // Inactive targets stay reachable so they can be reactivated.
    let target = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    policy::can_modify(actor.user(), &target).into_result()?;

    if let Some(email) = req.email.as_deref() {
        if email != target.email && db::users::email_exists(&state.pool, email).await? {
            return Err(AppError::BadRequest("Email already in use".to_string()));
        }
    }

    let password_hash = match req.password.as_deref() {
        Some(pw) => Some(password::hash(pw).map_err(AppError::Internal)?),
        None => None,
    };

    let changes = UserChanges {
        name: req.name.clone(),
        email: req.email.clone(),
        password_hash,
        role: req.role,
        is_active: req.is_active,
    };

    // The row can vanish between the policy check and the write.
    let user = db::users::update(&state.pool, id, &changes)
        .await
        .map_err(AppError::from_email_conflict)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(actor.id()),
        "user.updated",
        "user",
        Some(user.id),
        Some(serde_json::json!({ "fields": req.changed_fields() })),
    )
    .await;

    Ok(Json(user))
}

/// Soft delete: flips `is_active` off, the row is kept.
pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    actor.require_admin()?;

    let target = db::users::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    policy::can_modify(actor.user(), &target).into_result()?;

    if !db::users::soft_delete(&state.pool, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %actor.id(), "User deactivated");

    audit::log_event(
        &state.pool,
        Some(actor.id()),
        "user.deleted",
        "user",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
