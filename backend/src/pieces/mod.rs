//! Piece registry - the actions and triggers this service exposes to the host

pub mod mailer_lite;
pub mod saints;

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Metadata of a single action or trigger as listed to the host
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<serde_json::Value>,
}

impl OperationMetadata {
    pub const fn new(name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            display_name,
            description,
            sample_data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceMetadata {
    pub name: &'static str,
    pub display_name: &'static str,
    pub logo_url: &'static str,
    pub minimum_supported_release: &'static str,
    pub actions: Vec<OperationMetadata>,
    pub triggers: Vec<OperationMetadata>,
}

pub fn registry() -> Vec<PieceMetadata> {
    vec![saints::metadata(), mailer_lite::metadata()]
}

pub fn piece_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_pieces))
        .nest("/saints", saints::saints_routes())
        .nest("/mailer-lite", mailer_lite::mailer_lite_routes())
}

async fn list_pieces() -> Json<Vec<PieceMetadata>> {
    Json(registry())
}
