use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use pieces_shared::{MessageContent, User};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::{Config, MailerLiteConfig, PostgresAuth};
use crate::http::HttpClient;
use crate::store::{MemoryKeyValueStore, MemoryMessageStore, MemoryUserStore};
use crate::AppState;

pub fn test_config(mailer_lite_url: &str) -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        public_url: "https://pieces.test".to_string(),
        postgres: PostgresAuth {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "test".to_string(),
            password: "test".to_string(),
            database: "saints_test".to_string(),
            enable_ssl: false,
            reject_unauthorized: false,
            certificate: None,
        },
        mailer_lite: MailerLiteConfig {
            api_key: "ml-test-key".to_string(),
            base_url: mailer_lite_url.to_string(),
        },
    }
}

/// In-memory application state; the stores are returned for inspection
pub struct TestApp {
    pub router: Router,
    pub messages: Arc<MemoryMessageStore>,
    pub kv: Arc<MemoryKeyValueStore>,
}

pub fn test_app(users: Vec<User>, contents: Vec<MessageContent>, mailer_lite_url: &str) -> TestApp {
    let messages = Arc::new(MemoryMessageStore::with_contents(contents));
    let kv = Arc::new(MemoryKeyValueStore::default());

    let state = AppState {
        config: test_config(mailer_lite_url),
        db_pool: None,
        users: Arc::new(MemoryUserStore::new(users)),
        messages: messages.clone(),
        kv: kv.clone(),
        http: HttpClient::new(),
    };

    TestApp {
        router: crate::app(Arc::new(state)),
        messages,
        kv,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not JSON")
    };
    (status, body)
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub fn user_ids(page: &Value) -> Vec<i64> {
    page["users"]
        .as_array()
        .expect("users array")
        .iter()
        .map(|u| u["id"].as_i64().expect("user id"))
        .collect()
}
