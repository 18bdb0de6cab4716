use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Role, User};

/// Fields applied by a partial update. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
    created_by_id: Option<Uuid>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password_hash, role, is_active, created_by_id)
         VALUES ($1, $2, $3, $4, TRUE, $5) RETURNING *",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(created_by_id)
    .fetch_one(executor)
    .await
}

/// Lookup by primary key regardless of the active flag.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_active_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_active_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND is_active")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Email uniqueness spans inactive accounts too.
pub async fn email_exists<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn list_active_except(pool: &PgPool, excluded: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_active AND id <> $1 ORDER BY name")
        .bind(excluded)
        .fetch_all(pool)
        .await
}

pub async fn list_active_created_by(
    pool: &PgPool,
    creator_id: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_active AND created_by_id = $1 ORDER BY name",
    )
    .bind(creator_id)
    .fetch_all(pool)
    .await
}

pub async fn list_inactive(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE NOT is_active ORDER BY name")
        .fetch_all(pool)
        .await
}

/// Apply a partial update. Returns `None` when the row no longer exists.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            role = COALESCE($5, role),
            is_active = COALESCE($6, is_active),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.password_hash.as_deref())
    .bind(changes.role)
    .bind(changes.is_active)
    .fetch_optional(pool)
    .await
}

/// Flip the active flag off. Returns `false` when no active row matched.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
