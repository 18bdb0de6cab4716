#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use base_api::config::{AdminSeed, Config, JwtConfig, RegistrationMode};

pub const ROOT_EMAIL: &str = "root@test.com";
pub const ROOT_PASSWORD: &str = "rootpass123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub config: Config,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/auth/register",
            None,
            &json!({
                "name": name,
                "email": email,
                "password": password,
                "confirmPassword": password,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Login and return the bearer token, asserting success.
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let (body, status) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed for {email}: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Seed the root admin and the default settings row, return the root token.
    pub async fn bootstrap(&self) -> String {
        let admin = AdminSeed {
            email: ROOT_EMAIL.to_string(),
            name: "Root Admin".to_string(),
            password: ROOT_PASSWORD.to_string(),
        };
        base_api::seed::run(&self.pool, Some(&admin))
            .await
            .expect("seeding failed");
        self.token_for(ROOT_EMAIL, ROOT_PASSWORD).await
    }

    /// Create a user through the API as `token`, return the user JSON.
    pub async fn create_user(
        &self,
        token: &str,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Value {
        let (body, status) = self
            .post(
                "/api/users",
                Some(token),
                &json!({ "name": name, "email": email, "password": password, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
        body
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (Value, StatusCode) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> (Value, StatusCode) {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: &Value) -> (Value, StatusCode) {
        let mut req = self.client.put(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> StatusCode {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req.send().await.expect("delete request failed").status()
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-jwt-secret-that-is-long-enough".to_string(),
        issuer: "base-api-test".to_string(),
        audience: "base-api-test".to_string(),
        expire_minutes: 60,
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database. Nothing is seeded.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(RegistrationMode::Open).await
}

pub async fn spawn_app_with(registration: RegistrationMode) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let db_name = format!("base_api_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt: test_jwt_config(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        registration,
        max_body_size: 1_048_576,
        db_max_connections: 5,
        db_connect_retries: 1,
        log_level: "warn".to_string(),
        admin_seed: None,
    };

    let app = base_api::build_app(pool.clone(), config.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
        config,
    }
}

/// Drop the test database after a test completes.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
