//! Saints piece - campaign actions over the `saints_*` Postgres schema

pub mod filter_user;
pub mod run_campaign;
pub mod send_in_app_messages;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use pieces_shared::DropdownOption;
use std::sync::Arc;

use super::{OperationMetadata, PieceMetadata};
use crate::config::PostgresAuth;
use crate::database::{self, AuthValidation};
use crate::error::ApiResult;
use crate::AppState;

pub fn metadata() -> PieceMetadata {
    PieceMetadata {
        name: "saints",
        display_name: "Saints",
        logo_url: "https://cdn.activepieces.com/pieces/saints.png",
        minimum_supported_release: "0.36.1",
        actions: vec![
            OperationMetadata::new("filter-user", "Filter users", "Filter users with pagination"),
            OperationMetadata::new("runCampaign", "Run campaign", "Define and run a user communication campaign"),
            OperationMetadata::new("sendInAppMessages", "Send in-app messages", "Send in-app messages to multiple users"),
        ],
        triggers: Vec::new(),
    }
}

pub fn saints_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actions/filter-user", post(filter_user::filter_user_handler))
        .route("/actions/run-campaign", post(run_campaign::run_campaign_handler))
        .route("/actions/send-in-app-messages", post(send_in_app_messages::send_in_app_messages_handler))
        .route("/messages", get(list_message_options))
        .route("/auth/validate", post(validate_auth))
}

/// Message contents as dropdown options (label: title, value: id)
pub async fn message_options(state: &AppState) -> ApiResult<Vec<DropdownOption<i32>>> {
    let contents = state.messages.list_contents().await?;
    Ok(contents
        .into_iter()
        .map(|c| DropdownOption {
            label: c.title,
            value: c.id,
        })
        .collect())
}

async fn list_message_options(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DropdownOption<i32>>>> {
    Ok(Json(message_options(&state).await?))
}

async fn validate_auth(Json(auth): Json<PostgresAuth>) -> Json<AuthValidation> {
    Json(database::validate_auth(&auth).await)
}
