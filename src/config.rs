use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: IpAddr,
    pub port: u16,
    pub registration: RegistrationMode,
    pub max_body_size: usize,
    pub db_max_connections: u32,
    pub db_connect_retries: u32,
    pub log_level: String,
    pub admin_seed: Option<AdminSeed>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expire_minutes: i64,
}

/// Root admin created at startup when no user with this email exists.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let jwt = JwtConfig {
            secret: env_required("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "base-api"),
            audience: env_or("JWT_AUDIENCE", "base-api"),
            expire_minutes: env_or("JWT_EXPIRE_MINUTES", "60")
                .parse()
                .map_err(|e| format!("Invalid JWT_EXPIRE_MINUTES: {e}"))?,
        };

        if jwt.expire_minutes <= 0 {
            return Err("JWT_EXPIRE_MINUTES must be positive".to_string());
        }

        let host: IpAddr = env_or("BASEAPI_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid BASEAPI_HOST: {e}"))?;

        let port: u16 = env_or("BASEAPI_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid BASEAPI_PORT: {e}"))?;

        let registration = match env_or("BASEAPI_REGISTRATION", "open").as_str() {
            "closed" => RegistrationMode::Closed,
            _ => RegistrationMode::Open,
        };

        let max_body_size: usize = env_or("BASEAPI_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid BASEAPI_MAX_BODY_SIZE: {e}"))?;

        let db_max_connections: u32 = env_or("BASEAPI_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid BASEAPI_DB_MAX_CONNECTIONS: {e}"))?;

        let db_connect_retries: u32 = env_or("BASEAPI_DB_CONNECT_RETRIES", "5")
            .parse()
            .map_err(|e| format!("Invalid BASEAPI_DB_CONNECT_RETRIES: {e}"))?;

        let log_level = env_or("BASEAPI_LOG_LEVEL", "info");

        let admin_seed = match (
            env_non_blank("ADMIN_EMAIL"),
            env_non_blank("ADMIN_NAME"),
            env_non_blank("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(name), Some(password)) => Some(AdminSeed {
                email,
                name,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt,
            host,
            port,
            registration,
            max_body_size,
            db_max_connections,
            db_connect_retries,
            log_level,
            admin_seed,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
