use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration loaded from environment variables.
/// Everything here has a default; secrets live in `Credentials`.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Overrides the HTML template compiled into the binary.
    pub template_path: Option<PathBuf>,
    pub wkhtmltopdf_path: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            data_dir: env_or("PERSONA_DATA_DIR", "data").into(),
            output_dir: env_or("PERSONA_OUTPUT_DIR", "output").into(),
            template_path: std::env::var("PERSONA_TEMPLATE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            wkhtmltopdf_path: env_or("WKHTMLTOPDF_PATH", "wkhtmltopdf"),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// API credentials for Reddit and OpenAI.
/// Only the `run` command needs these, so they are loaded on first use.
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Credentials {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            reddit_client_id: require_env("REDDIT_CLIENT_ID")?,
            reddit_client_secret: require_env("REDDIT_CLIENT_SECRET")?,
            reddit_user_agent: require_env("REDDIT_USER_AGENT")?,
        })
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_user_agent", &self.reddit_user_agent)
            .finish_non_exhaustive()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
