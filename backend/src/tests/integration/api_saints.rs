use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::tests::fixtures::{message_content, sample_users};
use crate::tests::helpers::{get, post_json, test_app, user_ids};

const FILTER_USER: &str = "/api/v1/pieces/saints/actions/filter-user";

#[tokio::test]
async fn test_filter_user_by_platform() {
    let app = test_app(sample_users(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = post_json(
        &app.router,
        FILTER_USER,
        json!({
            "page": 1,
            "usersPerPage": 100,
            "filters": [{ "field": "platform", "operator": "eq", "value": "ios" }]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(user_ids(&body), vec![1, 3]);
    assert_eq!(body["numberOfUsers"], 2);
    assert_eq!(body["nextPage"], 2);
    assert_eq!(body["users"][0]["platform"], "ios");
}

#[tokio::test]
async fn test_filter_user_pages_through_results() {
    let app = test_app(sample_users(), Vec::new(), "http://127.0.0.1:9");

    let (_, first) = post_json(&app.router, FILTER_USER, json!({ "page": 1, "usersPerPage": 2 })).await;
    let (_, second) = post_json(&app.router, FILTER_USER, json!({ "page": 2, "usersPerPage": 2 })).await;
    let (_, past_end) = post_json(&app.router, FILTER_USER, json!({ "page": 4, "usersPerPage": 2 })).await;

    assert_eq!(user_ids(&first), vec![1, 2]);
    assert_eq!(user_ids(&second), vec![3, 4]);
    assert!(user_ids(&past_end).is_empty());
    assert_eq!(past_end["nextPage"], 5);
}

#[tokio::test]
async fn test_filter_user_accepts_column_alias() {
    let app = test_app(sample_users(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = post_json(
        &app.router,
        FILTER_USER,
        json!({ "filters": [{ "column": "track_accepted_date", "operator": "isNotNull" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(user_ids(&body), vec![1, 2]);
}

#[tokio::test]
async fn test_filter_user_rejects_unknown_field() {
    let app = test_app(sample_users(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = post_json(
        &app.router,
        FILTER_USER,
        json!({ "filters": [{ "field": "doesNotExist", "operator": "eq", "value": 1 }] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["doesNotExist"][0], "Unknown field: doesNotExist");
    assert!(body.get("users").is_none());
}

#[tokio::test]
async fn test_message_dropdown() {
    let app = test_app(
        Vec::new(),
        vec![message_content(2, "Spring sale"), message_content(1, "Welcome")],
        "http://127.0.0.1:9",
    );
    let (status, body) = get(&app.router, "/api/v1/pieces/saints/messages").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "label": "Welcome", "value": 1 }, { "label": "Spring sale", "value": 2 }])
    );
}

#[tokio::test]
async fn test_send_in_app_messages_from_filter_output() {
    let app = test_app(sample_users(), vec![message_content(1, "Welcome")], "http://127.0.0.1:9");
    let (_, page) = post_json(
        &app.router,
        FILTER_USER,
        json!({ "filters": [{ "field": "platform", "operator": "eq", "value": "android" }] }),
    )
    .await;

    let (status, body) = post_json(
        &app.router,
        "/api/v1/pieces/saints/actions/send-in-app-messages",
        json!({ "users": page["users"], "messageId": 1, "campaignId": "spring" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);

    let mut recipients: Vec<i32> = app.messages.messages().await.iter().map(|m| m.user_id).collect();
    recipients.sort();
    assert_eq!(recipients, vec![2, 4]);
}

#[tokio::test]
async fn test_run_campaign_reaches_runner() {
    let runner = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&runner)
        .await;

    let app = test_app(Vec::new(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = post_json(
        &app.router,
        "/api/v1/pieces/saints/actions/run-campaign",
        json!({
            "filters": [{ "field": "platform", "operator": "eq", "value": "ios" }],
            "messageId": 1,
            "campaignRunnerUrl": format!("{}/run", runner.uri())
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["launched"], true);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Campaign launched successfully"));
}

#[tokio::test]
async fn test_filter_user_rejects_huge_page() {
    let app = test_app(sample_users(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = post_json(
        &app.router,
        FILTER_USER,
        json!({ "page": i64::MAX, "usersPerPage": 1000 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["page"][0], "Page is out of range");
}
