use serde::{Deserialize, Serialize};

use crate::config::MailerLiteConfig;
use crate::http::{custom_api_call::join_base_url, CustomApiCall, HttpClient, HttpError, HttpMethod, HttpRequest};

/// Webhook as registered on the MailerLite side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    /// Key MailerLite signs deliveries with
    #[serde(default)]
    pub secret: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    data: Webhook,
}

#[derive(Debug, Clone)]
pub struct MailerLiteClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl MailerLiteClient {
    pub fn new(http: HttpClient, config: &MailerLiteConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Custom API call bound to this account
    pub fn custom_api_call(&self) -> CustomApiCall {
        CustomApiCall::new(self.base_url.clone()).with_auth_header("Authorization", format!("Bearer {}", self.api_key))
    }

    pub async fn create_webhook(&self, name: &str, events: &[&str], url: &str) -> Result<Webhook, HttpError> {
        let request = HttpRequest::new(HttpMethod::Post, join_base_url(&self.base_url, "webhooks"))
            .with_bearer(&self.api_key)
            .with_json(serde_json::json!({
                "name": name,
                "events": events,
                "url": url,
            }));

        let response = self.http.send(request).await?;
        let envelope: WebhookEnvelope = serde_json::from_value(response.body).map_err(|e| HttpError::Transport {
            url: join_base_url(&self.base_url, "webhooks"),
            message: format!("Unexpected webhook response: {}", e),
        })?;
        Ok(envelope.data)
    }

    pub async fn delete_webhook(&self, id: &str) -> Result<(), HttpError> {
        let request = HttpRequest::new(HttpMethod::Delete, join_base_url(&self.base_url, &format!("webhooks/{}", id)))
            .with_bearer(&self.api_key);
        self.http.send(request).await?;
        Ok(())
    }
}
