/// Runtime configuration
///
/// All settings come from the environment (a `.env` file is loaded by main
/// before the first access). The API key is the only secret; it is read at
/// startup and never logged.

use std::env;

use anyhow::Result;
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API credential. May be empty; generation fails with a clear
    /// message instead of the app refusing to start.
    pub gemini_api_key: String,
    /// Image-capable Gemini model used for restoration.
    pub gemini_image_model: String,
    /// Default log level when RUST_LOG is not set.
    pub log_level: String,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_image_model: env_or("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image-preview"),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }
}
