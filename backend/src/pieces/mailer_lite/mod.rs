//! MailerLite piece - subscriber webhooks and a raw API escape hatch

pub mod client;
pub mod triggers;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use self::client::{MailerLiteClient, Webhook};
use self::triggers::TriggerDefinition;
use super::{OperationMetadata, PieceMetadata};
use crate::error::{ApiResult, AppError};
use crate::http::CustomApiCallProps;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "Signature";

pub fn metadata() -> PieceMetadata {
    PieceMetadata {
        name: "mailer-lite",
        display_name: "MailerLite",
        logo_url: "https://cdn.activepieces.com/pieces/mailer-lite.png",
        minimum_supported_release: "0.20.0",
        actions: vec![OperationMetadata::new(
            "custom_api_call",
            "Custom API Call",
            "Make a custom API call to a specific endpoint",
        )],
        triggers: triggers::TRIGGERS.iter().map(TriggerDefinition::metadata).collect(),
    }
}

pub fn mailer_lite_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actions/custom-api-call", post(custom_api_call))
        .route("/triggers/:event/enable", post(enable_trigger))
        .route("/triggers/:event/disable", post(disable_trigger))
        .route("/webhooks/:event", post(receive_webhook))
}

fn client(state: &AppState) -> ApiResult<MailerLiteClient> {
    if !state.config.mailer_lite.is_configured() {
        return Err(AppError::BadRequest("MailerLite API key is not configured".to_string()));
    }
    Ok(MailerLiteClient::new(state.http.clone(), &state.config.mailer_lite))
}

fn trigger(event: &str) -> ApiResult<TriggerDefinition> {
    triggers::find(event).ok_or_else(|| AppError::NotFound(format!("Unknown MailerLite trigger: {}", event)))
}

async fn custom_api_call(
    State(state): State<Arc<AppState>>,
    Json(props): Json<CustomApiCallProps>,
) -> ApiResult<Json<Value>> {
    let call = client(&state)?.custom_api_call();
    Ok(Json(call.run(&state.http, props).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableTriggerRequest {
    pub name: Option<String>,
    /// Where MailerLite should deliver; defaults to this service's webhook route
    pub webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DisableOutcome {
    pub removed: bool,
}

async fn enable_trigger(
    State(state): State<Arc<AppState>>,
    Path(event): Path<String>,
    body: Option<Json<EnableTriggerRequest>>,
) -> ApiResult<Json<Webhook>> {
    let trigger = trigger(&event)?;
    let client = client(&state)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let webhook_url = request.webhook_url.unwrap_or_else(|| {
        format!(
            "{}/api/v1/pieces/mailer-lite/webhooks/{}",
            state.config.public_url.trim_end_matches('/'),
            trigger.event
        )
    });
    let name = request.name.unwrap_or_else(|| trigger.display_name.to_string());

    let webhook = trigger.on_enable(&client, state.kv.as_ref(), &name, &webhook_url).await?;
    Ok(Json(webhook))
}

async fn disable_trigger(
    State(state): State<Arc<AppState>>,
    Path(event): Path<String>,
) -> ApiResult<Json<DisableOutcome>> {
    let trigger = trigger(&event)?;
    let client = client(&state)?;
    let removed = trigger.on_disable(&client, state.kv.as_ref()).await?;
    Ok(Json(DisableOutcome { removed }))
}

async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    Path(event): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Vec<Value>>> {
    let trigger = trigger(&event)?;
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let output = trigger.run(state.kv.as_ref(), signature, &body).await?;

    tracing::debug!(event = trigger.event, "MailerLite delivery accepted");
    Ok(Json(output))
}
