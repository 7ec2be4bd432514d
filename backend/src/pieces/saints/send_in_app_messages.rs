use axum::{extract::State, response::Json};
use chrono::Utc;
use pieces_shared::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::store::MessageStore;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInAppMessagesProps {
    /// Users to message, usually the `users` output of filter-user
    pub users: Value,
    pub message_id: i32,
    pub campaign_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub inserted: u64,
}

/// Pull the integer `id` out of every user object
pub fn user_ids(users: &Value) -> ApiResult<Vec<i32>> {
    // JSON properties may arrive as an encoded string
    let parsed;
    let users = match users {
        Value::String(raw) => {
            parsed = serde_json::from_str::<Value>(raw)
                .map_err(|_| ApiError::validation_single("users", "Users must be a JSON array"))?;
            &parsed
        }
        other => other,
    };

    let list = users
        .as_array()
        .ok_or_else(|| ApiError::validation_single("users", "Users must be a JSON array"))?;

    list.iter()
        .enumerate()
        .map(|(i, user)| {
            user.get("id")
                .and_then(Value::as_i64)
                .and_then(|id| i32::try_from(id).ok())
                .ok_or_else(|| ApiError::validation_single("users", format!("User at index {} has no integer id", i)))
        })
        .collect()
}

pub async fn send_in_app_messages(store: &dyn MessageStore, props: &SendInAppMessagesProps) -> ApiResult<SendOutcome> {
    let ids = user_ids(&props.users)?;
    let now = Utc::now();

    let messages: Vec<Message> = ids
        .into_iter()
        .map(|user_id| Message {
            user_id,
            content_id: props.message_id,
            created_at: now,
            delivered_at: None,
            read_at: None,
            campaign_id: Some(props.campaign_id.clone()),
        })
        .collect();

    let inserted = store.insert_messages(&messages).await?;
    tracing::info!(campaign_id = %props.campaign_id, content_id = props.message_id, inserted, "queued in-app messages");

    Ok(SendOutcome { inserted })
}

pub async fn send_in_app_messages_handler(
    State(state): State<Arc<AppState>>,
    Json(props): Json<SendInAppMessagesProps>,
) -> ApiResult<Json<SendOutcome>> {
    Ok(Json(send_in_app_messages(state.messages.as_ref(), &props).await?))
}
