pub mod app_settings;
pub mod audit;
pub mod users;
