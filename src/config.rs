use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub engine_url: String,
    pub engine_timeout_secs: u64,
    pub generation_api_url: String,
    pub generation_api_key: String,
    pub generation_model: String,
    pub generation_max_tokens: u32,
    pub generation_timeout_secs: u64,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/trading".into()),
            engine_url: std::env::var("ENGINE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            // activation can deploy state for several wallets on the
            // engine side, so it gets more headroom than generation
            engine_timeout_secs: std::env::var("ENGINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .context("ENGINE_TIMEOUT_SECS must be u64")?,
            generation_api_url: std::env::var("GENERATION_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into()),
            generation_api_key: std::env::var("GENERATION_API_KEY").unwrap_or_default(),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            generation_max_tokens: std::env::var("GENERATION_MAX_TOKENS")
                .unwrap_or_else(|_| "2048".into())
                .parse()
                .context("GENERATION_MAX_TOKENS must be u32")?,
            generation_timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .context("GENERATION_TIMEOUT_SECS must be u64")?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("API_PORT must be u16")?,
        })
    }
}
