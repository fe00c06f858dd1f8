// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub open_router_api_key: String,
    pub openrouter_api_base: String,
    pub openrouter_model: String,
    pub openrouter_max_tokens: u32,
    pub openrouter_temperature: f32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let open_router_api_key =
            env::var("OPEN_ROUTER_API_KEY").expect("OPEN_ROUTER_API_KEY must be set");

        let openrouter_api_base = env::var("OPENROUTER_API_BASE")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());

        let openrouter_model =
            env::var("OPENROUTER_MODEL").unwrap_or_else(|_| "deepseek/deepseek-r1".to_string());

        let openrouter_max_tokens = env::var("OPENROUTER_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2048);

        let openrouter_temperature = env::var("OPENROUTER_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.7);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            open_router_api_key,
            openrouter_api_base,
            openrouter_model,
            openrouter_max_tokens,
            openrouter_temperature,
            rust_log,
        }
    }
}
