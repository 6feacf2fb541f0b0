use anyhow::{Context, Result};

/// Object storage settings for archiving validation reports.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL document store. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    /// Redis used as the reminder delivery queue. `None` logs deliveries only.
    pub redis_url: Option<String>,
    /// Report archive. `None` keeps reports in the store only.
    pub s3: Option<S3Settings>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub reminder_poll_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            s3: s3_from_env()?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reminder_poll_secs: std::env::var("REMINDER_POLL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .context("REMINDER_POLL_SECS must be a whole number of seconds")?,
        })
    }
}

/// The archive is all-or-nothing: setting only some of the S3 variables is an error.
fn s3_from_env() -> Result<Option<S3Settings>> {
    let Some(bucket) = optional_env("S3_BUCKET") else {
        return Ok(None);
    };
    Ok(Some(S3Settings {
        bucket,
        endpoint: require_env("S3_ENDPOINT")?,
        access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
        secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
    }))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
