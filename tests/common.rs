use async_trait::async_trait;
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::sync::Arc;
use tera::Tera;
use uuid::Uuid;

use parish_backend::{
    api::router::create_router,
    config::Config,
    domain::models::auth::Claims,
    domain::ports::{EmailService, MediaAssetResolver},
    error::AppError,
    infra::permissions::ClaimsPermissionChecker,
    infra::repositories::{
        sqlite_event_repo::SqliteEventRepo, sqlite_instance_repo::SqliteInstanceRepo,
        sqlite_registration_repo::SqliteRegistrationRepo,
    },
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_ISSUER: &str = "test-issuer";

pub struct MockEmailService;

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        _recipient: &str,
        _subject: &str,
        _html_body: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct MockMediaResolver;

#[async_trait]
impl MediaAssetResolver for MockMediaResolver {
    async fn resolve_url(&self, asset_id: &str) -> String {
        format!("https://cdn.test/{asset_id}")
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        tera.add_raw_template(
            "registration_confirmation.html",
            "<html>Mock confirmation for {{ attendee_name }}</html>",
        )
        .unwrap();
        let templates = Arc::new(tera);

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: TEST_SECRET.to_string(),
            auth_issuer: TEST_ISSUER.to_string(),
            media_service_url: "http://localhost".to_string(),
            placeholder_image_url: "/static/placeholder.png".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            upstream_timeout_ms: 1000,
        };

        let state = Arc::new(AppState {
            config,
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            instance_repo: Arc::new(SqliteInstanceRepo::new(pool.clone())),
            registration_repo: Arc::new(SqliteRegistrationRepo::new(pool.clone())),
            media_resolver: Arc::new(MockMediaResolver),
            permissions: Arc::new(ClaimsPermissionChecker),
            email_service: Arc::new(MockEmailService),
            templates,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub fn token_with_caps(&self, caps: &[&str]) -> String {
        let claims = Claims {
            sub: "test-admin".to_string(),
            iss: TEST_ISSUER.to_string(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
            caps: caps.iter().map(|c| c.to_string()).collect(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_with_caps(&["events:manage", "registrations:manage"])
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
