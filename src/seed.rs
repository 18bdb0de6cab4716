use sqlx::PgPool;

use crate::auth::password;
use crate::config::AdminSeed;
use crate::db;
use crate::error::AppError;
use crate::models::Role;

/// Idempotent startup seeding: root admin (when configured) and the default settings row.
pub async fn run(pool: &PgPool, admin: Option<&AdminSeed>) -> Result<(), AppError> {
    match admin {
        Some(admin) => {
            seed_admin(pool, admin).await?;
        }
        None => tracing::warn!(
            "ADMIN_EMAIL, ADMIN_NAME and ADMIN_PASSWORD not all set. Skipping admin seed."
        ),
    }

    if db::app_settings::seed_default(pool).await? {
        tracing::info!("Default application settings created");
    }

    Ok(())
}

/// Create the root admin unless an account with its email already exists.
pub async fn seed_admin(pool: &PgPool, admin: &AdminSeed) -> Result<bool, AppError> {
    if db::users::email_exists(pool, &admin.email).await? {
        tracing::info!(email = %admin.email, "Admin user already exists");
        return Ok(false);
    }

    let pw_hash = password::hash(&admin.password).map_err(AppError::Internal)?;

    match db::users::create(pool, &admin.name, &admin.email, &pw_hash, Role::Admin, None).await {
        Ok(user) => {
            tracing::info!(email = %user.email, user_id = %user.id, "Admin user created");
            Ok(true)
        }
        // Another instance seeded it first.
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => Ok(false),
        Err(e) => Err(AppError::Database(e)),
    }
}
