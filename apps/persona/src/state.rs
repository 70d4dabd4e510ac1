use std::sync::Arc;

use crate::config::{Config, Credentials};
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::reddit::{ActivitySource, RedditClient, DEFAULT_LIMIT};

/// Everything a persona run needs, built once in `main` and passed down explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub llm: Arc<dyn CompletionProvider>,
    pub source: Arc<dyn ActivitySource>,
    /// Posts and comments requested per user.
    pub fetch_limit: usize,
}

impl AppContext {
    pub fn new(config: Config, credentials: &Credentials) -> Self {
        Self {
            config,
            llm: Arc::new(LlmClient::new(credentials.openai_api_key.clone())),
            source: Arc::new(RedditClient::new(credentials)),
            fetch_limit: DEFAULT_LIMIT,
        }
    }
}
