pub mod app_settings;
pub mod auth;
pub mod users;

use axum::extract::{FromRequest, FromRequestParts};
use axum::routing::{get, post};
use axum::Router;

use crate::error::AppError;
use crate::state::SharedState;

/// JSON body extractor that reports malformed input as a 400 in the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor with the same error shape, so a malformed id is a JSON 400.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/inactive", get(users::list_inactive))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // White-label settings
        .route(
            "/api/appsettings",
            get(app_settings::get_settings).put(app_settings::update_settings),
        )
}
