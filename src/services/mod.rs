pub mod app_settings;
pub mod auth;

pub use app_settings::AppSettingsService;
pub use auth::AuthService;
