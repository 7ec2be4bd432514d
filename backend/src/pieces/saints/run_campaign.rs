use axum::{extract::State, response::Json};
use pieces_shared::FilterCondition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, AppError};
use crate::filters::{conditions::NormalizedCondition, translate};
use crate::http::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCampaignProps {
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    pub message_id: i32,
    pub campaign_runner_url: String,
}

/// Body posted to the campaign runner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDispatch {
    pub filters: Vec<NormalizedCondition>,
    pub message_id: i32,
    pub campaign_id: String,
    pub page: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignOutcome {
    pub launched: bool,
    pub campaign_id: String,
    pub message: String,
}

/// Validate the campaign filters and hand the campaign to the runner.
///
/// The filters are only validated here; the runner pages through users itself
/// starting at page 1. A runner that answers with an error status is reported
/// in the outcome, an unreachable runner is an error.
pub async fn run_campaign(http: &HttpClient, props: &RunCampaignProps, campaign_id: &str) -> ApiResult<CampaignOutcome> {
    let conjunction = translate(&props.filters)?;

    let runner_url = url::Url::parse(&props.campaign_runner_url)
        .map_err(|e| ApiError::validation_single("campaignRunnerUrl", format!("Invalid URL: {}", e)))?;

    let dispatch = CampaignDispatch {
        filters: conjunction.normalized(),
        message_id: props.message_id,
        campaign_id: campaign_id.to_string(),
        page: 1,
    };
    let body = serde_json::to_value(&dispatch).map_err(|e| AppError::InternalError(e.to_string()))?;

    let request = HttpRequest::new(HttpMethod::Post, runner_url.as_str())
        .with_header("Content-Type", "application/json")
        .with_json(body);

    match http.send(request).await {
        Ok(_) => {
            tracing::info!(campaign_id, message_id = props.message_id, "campaign launched");
            Ok(CampaignOutcome {
                launched: true,
                campaign_id: campaign_id.to_string(),
                message: format!("Campaign launched successfully (id: {})", campaign_id),
            })
        }
        Err(HttpError::Status { status, body, .. }) => {
            tracing::warn!(campaign_id, status, "campaign runner rejected campaign");
            Ok(CampaignOutcome {
                launched: false,
                campaign_id: campaign_id.to_string(),
                message: match body {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn run_campaign_handler(
    State(state): State<Arc<AppState>>,
    Json(props): Json<RunCampaignProps>,
) -> ApiResult<Json<CampaignOutcome>> {
    let campaign_id = Uuid::new_v4().to_string();
    Ok(Json(run_campaign(&state.http, &props, &campaign_id).await?))
}
