use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod database;
mod error;
mod filters;
mod http;
mod pagination;
mod pieces;
mod store;

pub use error::{ApiError, ApiResult, AppError};

#[cfg(test)]
mod tests;

use store::{
    KeyValueStore, MemoryKeyValueStore, MemoryMessageStore, MemoryUserStore, MessageStore, PgKeyValueStore,
    PgMessageStore, PgUserStore, UserStore,
};

pub struct AppState {
    pub config: config::Config,
    /// Absent when running on the in-memory stores
    pub db_pool: Option<sqlx::PgPool>,
    pub users: Arc<dyn UserStore>,
    pub messages: Arc<dyn MessageStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub http: http::HttpClient,
}

impl AppState {
    pub fn with_pool(config: config::Config, pool: sqlx::PgPool) -> Self {
        Self {
            config,
            users: Arc::new(PgUserStore::new(pool.clone())),
            messages: Arc::new(PgMessageStore::new(pool.clone())),
            kv: Arc::new(PgKeyValueStore::new(pool.clone())),
            db_pool: Some(pool),
            http: http::HttpClient::new(),
        }
    }

    pub fn in_memory(config: config::Config) -> Self {
        Self {
            config,
            db_pool: None,
            users: Arc::new(MemoryUserStore::default()),
            messages: Arc::new(MemoryMessageStore::default()),
            kv: Arc::new(MemoryKeyValueStore::default()),
            http: http::HttpClient::new(),
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/pieces", pieces::piece_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let database = match &state.db_pool {
        Some(pool) if database::health_check(pool).await => "up",
        Some(_) => "down",
        None => "memory",
    };

    let status = if database == "down" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(json!({ "status": if status.is_success() { "healthy" } else { "degraded" }, "service": "pieces-api", "database": database })),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let server_addr = config.server_addr.clone();

    let state = if std::env::var("PIECES_STORE").as_deref() == Ok("memory") {
        tracing::warn!("Running on in-memory stores, nothing will be persisted");
        AppState::in_memory(config)
    } else {
        let db_pool = database::create_pool(&config.postgres).await?;
        database::migrate(&db_pool).await?;
        AppState::with_pool(config, db_pool)
    };

    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&server_addr).await?;
    tracing::info!("Server running on {}", server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
