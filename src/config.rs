use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub media_service_url: String,
    pub placeholder_image_url: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    /// Timeout for outbound collaborator calls (media, mail), in milliseconds.
    pub upstream_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER")
                .unwrap_or_else(|_| "https://api.parish.local".to_string()),
            media_service_url: env::var("MEDIA_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8100/api/v1/assets".to_string()),
            placeholder_image_url: env::var("PLACEHOLDER_IMAGE_URL")
                .unwrap_or_else(|_| "/static/placeholder.png".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN")
                .unwrap_or_else(|_| "test-token-1".to_string()),
            upstream_timeout_ms: env::var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("UPSTREAM_TIMEOUT_MS must be a number"),
        }
    }
}
