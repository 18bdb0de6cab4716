pub mod app_settings;
pub mod audit_event;
pub mod user;

pub use app_settings::AppSettings;
pub use audit_event::AuditEvent;
pub use user::{Role, User};
