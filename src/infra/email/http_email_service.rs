use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::domain::ports::EmailService;
use crate::error::AppError;

/// Sends mail through the shared HTTP mail relay. A failed send surfaces as a
/// transient error; callers decide whether the operation it belongs to
/// tolerates that. Nothing here retries.
pub struct HttpEmailService {
    client: reqwest::Client,
    service_url: String,
    token: String,
}

impl HttpEmailService {
    pub fn new(service_url: String, token: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build mail HTTP client");

        Self {
            client,
            service_url,
            token,
        }
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let payload = json!({
            "to": recipient,
            "subject": subject,
            "html": html_body,
        });

        let response = self
            .client
            .post(&self.service_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Transient(format!("mail service: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Transient(format!(
                "mail service returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
