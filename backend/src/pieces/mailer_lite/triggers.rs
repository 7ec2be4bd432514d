// MailerLite webhook triggers - subscriber lifecycle events

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use super::client::{MailerLiteClient, Webhook};
use crate::error::{ApiError, ApiResult, AppError};
use crate::pieces::OperationMetadata;
use crate::store::KeyValueStore;

type HmacSha256 = Hmac<Sha256>;

/// A subscriber event that can start a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerDefinition {
    pub event: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub const TRIGGERS: [TriggerDefinition; 3] = [
    TriggerDefinition {
        event: "subscriber.created",
        display_name: "New Subscription",
        description: "Fires when a new subscriber is added to an account",
    },
    TriggerDefinition {
        event: "subscriber.unsubscribed",
        display_name: "New Unsubscription",
        description: "Fires when a subscriber becomes unsubscribed",
    },
    TriggerDefinition {
        event: "subscriber.added_to_group",
        display_name: "Added to Group",
        description: "Fires when a subscriber is added to a group",
    },
];

pub fn find(event: &str) -> Option<TriggerDefinition> {
    TRIGGERS.into_iter().find(|t| t.event == event)
}

fn subscriber_sample() -> Value {
    json!({
        "id": "112375610569918142",
        "email": "aa@gmail.com",
        "status": "active",
        "source": "manual",
        "sent": null,
        "opens_count": null,
        "clicks_count": null,
        "open_rate": 0,
        "click_rate": 0,
        "ip_address": null,
        "subscribed_at": "2024-02-05T21:48:53.000000Z",
        "unsubscribed_at": null,
        "created_at": "2024-02-05T21:48:53.000000Z",
        "updated_at": "2024-02-05T21:48:53.000000Z",
        "deleted_at": null,
        "forget_at": null,
        "fields": {
            "name": "ad",
            "last_name": null,
            "company": null,
            "country": null,
            "city": null,
            "phone": null,
            "state": null,
            "z_i_p": null
        },
        "opted_in_at": null,
        "optin_ip": null
    })
}

impl TriggerDefinition {
    pub fn sample_data(&self) -> Value {
        match self.event {
            "subscriber.unsubscribed" => json!({
                "id": "112374478518880188",
                "email": "example@gmail.com",
                "status": "unsubscribed",
                "source": "manual",
                "sent": 0,
                "opens_count": 0,
                "clicks_count": 0,
                "open_rate": 0,
                "click_rate": 0,
                "ip_address": null,
                "subscribed_at": "2024-02-05 21:30:54",
                "unsubscribed_at": "2024-02-05 21:54:58",
                "created_at": "2024-02-05 21:30:53",
                "updated_at": "2024-02-05 21:54:58",
                "opted_in_at": null,
                "optin_ip": null,
                "email_changed_at": null
            }),
            "subscriber.added_to_group" => json!({
                "type": "subscriber.added_to_group",
                "subscriber": subscriber_sample(),
                "group": { "id": "108162245463115431", "name": "[M]'s Network" }
            }),
            _ => subscriber_sample(),
        }
    }

    pub fn metadata(&self) -> OperationMetadata {
        OperationMetadata {
            sample_data: Some(self.sample_data()),
            ..OperationMetadata::new(self.event, self.display_name, self.description)
        }
    }

    /// Store key holding the registered webhook
    pub fn store_key(&self) -> String {
        format!("mailer-lite:{}", self.event)
    }

    /// Register a webhook for this event and remember it
    pub async fn on_enable(
        &self,
        client: &MailerLiteClient,
        store: &dyn KeyValueStore,
        name: &str,
        webhook_url: &str,
    ) -> ApiResult<Webhook> {
        let webhook = client.create_webhook(name, &[self.event], webhook_url).await?;
        let value = serde_json::to_value(&webhook).map_err(|e| AppError::InternalError(e.to_string()))?;
        store.put(&self.store_key(), value).await?;

        tracing::info!(event = self.event, webhook_id = %webhook.id, "MailerLite webhook registered");
        Ok(webhook)
    }

    /// Remove the registered webhook, if any. Returns whether one was removed.
    pub async fn on_disable(&self, client: &MailerLiteClient, store: &dyn KeyValueStore) -> ApiResult<bool> {
        let Some(webhook) = self.stored_webhook(store).await? else {
            return Ok(false);
        };

        client.delete_webhook(&webhook.id).await?;
        store.delete(&self.store_key()).await?;

        tracing::info!(event = self.event, webhook_id = %webhook.id, "MailerLite webhook removed");
        Ok(true)
    }

    /// Turn one delivery into the trigger output
    pub async fn run(&self, store: &dyn KeyValueStore, signature: Option<&str>, body: &[u8]) -> ApiResult<Vec<Value>> {
        if let Some(secret) = self.stored_webhook(store).await?.and_then(|w| w.secret) {
            let signature = signature.ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;
            verify_signature(secret.as_bytes(), body, signature)?;
        }

        let payload: Value = serde_json::from_slice(body)
            .map_err(|_| ApiError::validation_single("body", "Webhook body must be JSON"))?;
        Ok(vec![payload])
    }

    async fn stored_webhook(&self, store: &dyn KeyValueStore) -> ApiResult<Option<Webhook>> {
        store
            .get(&self.store_key())
            .await?
            .map(serde_json::from_value::<Webhook>)
            .transpose()
            .map_err(|e| AppError::InternalError(format!("Corrupt webhook record: {}", e)))
    }
}

/// Constant-time check of a hex HMAC-SHA256 signature over the raw body
pub fn verify_signature(secret: &[u8], body: &[u8], signature_hex: &str) -> ApiResult<()> {
    let rejected = || AppError::Unauthorized("Webhook signature mismatch".to_string());

    let expected = hex::decode(signature_hex.trim()).map_err(|_| rejected())?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| AppError::InternalError(e.to_string()))?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| rejected())
}
