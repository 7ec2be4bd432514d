use axum::{extract::State, response::Json};
use pieces_shared::{FilterCondition, UserPage};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::filters::translate;
use crate::pagination::{default_page, default_page_size, PageWindow};
use crate::store::UserStore;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUserProps {
    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub users_per_page: i64,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
}

/// Translate the filters, fetch one page and report the next page cursor.
///
/// Nothing reaches the store unless both the page window and every condition
/// are valid.
pub async fn filter_users(store: &dyn UserStore, props: &FilterUserProps) -> ApiResult<UserPage> {
    let window = PageWindow::new(props.page, props.users_per_page)?;
    let conjunction = translate(&props.filters)?;

    let users = store.fetch_users(&conjunction, &window).await?;
    tracing::info!(
        page = window.page(),
        conditions = conjunction.len(),
        matched = users.len(),
        "filtered users"
    );

    Ok(window.into_page(users))
}

pub async fn filter_user_handler(
    State(state): State<Arc<AppState>>,
    Json(props): Json<FilterUserProps>,
) -> ApiResult<Json<UserPage>> {
    Ok(Json(filter_users(state.users.as_ref(), &props).await?))
}
