mod config;
mod dashboard;
mod db;
mod errors;
mod llm_client;
mod models;
mod planning;
mod reminders;
mod routes;
mod state;
mod storage;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, S3Settings};
use crate::db::build_store;
use crate::llm_client::LlmClient;
use crate::reminders::dispatcher::{spawn_dispatcher, LogSink, RedisQueue, ReminderSink};
use crate::routes::build_router;
use crate::state::AppState;
use crate::validation::report::ReportArchive;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("okr_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OKR API v{}", env!("CARGO_PKG_VERSION"));

    // Store: PostgreSQL or in-memory
    let store = build_store(config.database_url.as_deref()).await?;

    // LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Optional report archive
    let archive = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("Report archive enabled (bucket: {})", s3.bucket);
            Some(ReportArchive::new(client, s3.bucket.clone()))
        }
        None => {
            info!("S3 not configured; validation reports will not be archived");
            None
        }
    };

    // Reminder delivery: Redis queue when configured, log-only otherwise
    let sink: Arc<dyn ReminderSink> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis client initialized for reminder delivery");
            Arc::new(RedisQueue::new(client))
        }
        None => {
            info!("REDIS_URL not set; reminders will only be logged");
            Arc::new(LogSink)
        }
    };
    spawn_dispatcher(
        store.clone(),
        sink,
        Duration::from_secs(config.reminder_poll_secs.max(1)),
    );

    let state = AppState {
        store,
        llm: Arc::new(llm),
        archive,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(settings: &S3Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.access_key_id,
        &settings.secret_access_key,
        None,
        None,
        "okr-api-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&settings.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
