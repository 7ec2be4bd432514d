use axum::http::StatusCode;

use crate::tests::helpers::{get, test_app};

#[tokio::test]
async fn test_health_on_memory_stores() {
    let app = test_app(Vec::new(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = get(&app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "memory");
}

#[tokio::test]
async fn test_list_pieces() {
    let app = test_app(Vec::new(), Vec::new(), "http://127.0.0.1:9");
    let (status, body) = get(&app.router, "/api/v1/pieces").await;

    assert_eq!(status, StatusCode::OK);
    let pieces = body.as_array().unwrap();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0]["name"], "saints");
    assert_eq!(pieces[0]["actions"][0]["name"], "filter-user");
    assert_eq!(pieces[1]["triggers"][2]["name"], "subscriber.added_to_group");
    assert!(pieces[1]["triggers"][0]["sampleData"]["email"].is_string());
}
