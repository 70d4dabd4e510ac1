//! Source fetcher: pulls a user's recent submissions and comments from Reddit.
//!
//! Uses app-only OAuth: the client id/secret are exchanged for a bearer token,
//! then the user's `submitted` and `comments` listings are read newest first.
//! Retrieval faults never escape `fetch_user_activity`; the run continues with no input.

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::errors::AppError;

pub mod models;

pub use models::{CommentRecord, PostRecord, UserActivity};
use models::{Listing, RawComment, RawSubmission};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
/// Default number of posts and of comments requested per user.
pub const DEFAULT_LIMIT: usize = 50;
/// Reddit serves at most this many items per listing page.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reddit token exchange failed: {0}")]
    Token(String),

    #[error("Reddit user u/{0} does not exist")]
    UserNotFound(String),

    #[error("Reddit user u/{0} is suspended or private")]
    Forbidden(String),

    #[error("Reddit API error (status {status}) for {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Anything that can list a user's recent activity.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch(&self, username: &str, limit: usize) -> Result<UserActivity, FetchError>;
}

/// Fetches up to `limit` posts and `limit` comments, newest first.
///
/// Any fault is logged and turned into an empty result.
pub async fn fetch_user_activity(
    source: &dyn ActivitySource,
    username: &str,
    limit: usize,
) -> UserActivity {
    match source.fetch(username, limit).await {
        Ok(mut activity) => {
            activity
                .posts
                .sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
            activity
                .comments
                .sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
            activity.posts.truncate(limit);
            activity.comments.truncate(limit);
            info!(
                "Fetched {} posts and {} comments for u/{username}",
                activity.posts.len(),
                activity.comments.len()
            );
            activity
        }
        Err(e) => {
            warn!("Error scraping u/{username}: {e}");
            UserActivity::default()
        }
    }
}

/// Reddit API client. Constructed once per run from the supplied credentials.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    token_url: String,
    api_base_url: String,
    client_id: String,
    client_secret: String,
    user_agent: String,
}

impl RedditClient {
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_endpoints(credentials, TOKEN_URL, OAUTH_BASE_URL)
    }

    /// Points the client at another token endpoint and API host.
    pub(crate) fn with_endpoints(
        credentials: &Credentials,
        token_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token_url: token_url.into(),
            api_base_url: api_base_url.into(),
            client_id: credentials.reddit_client_id.clone(),
            client_secret: credentials.reddit_client_secret.clone(),
            user_agent: credentials.reddit_user_agent.clone(),
        }
    }

    async fn access_token(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(USER_AGENT, &self.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Token(format!("status {status}")));
        }

        let token: TokenResponse = response.json().await?;
        match (token.access_token, token.error) {
            (Some(access_token), _) => Ok(access_token),
            (None, Some(error)) => Err(FetchError::Token(error)),
            (None, None) => Err(FetchError::Token("no access_token in response".to_string())),
        }
    }

    async fn listing<T: DeserializeOwned>(
        &self,
        token: &str,
        username: &str,
        kind: &str,
        limit: usize,
    ) -> Result<Vec<T>, FetchError> {
        let url = format!("{}/user/{username}/{kind}", self.api_base_url);
        let page_size = limit.clamp(1, MAX_PAGE_SIZE).to_string();

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(USER_AGENT, &self.user_agent)
            .query(&[("sort", "new"), ("limit", page_size.as_str()), ("raw_json", "1")])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::UserNotFound(username.to_string())),
            StatusCode::FORBIDDEN => return Err(FetchError::Forbidden(username.to_string())),
            status if !status.is_success() => {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                })
            }
            _ => {}
        }

        let listing: Listing<T> = response.json().await?;
        debug!(
            "Listing {kind} for u/{username}: {} items",
            listing.data.children.len()
        );
        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }
}

#[async_trait]
impl ActivitySource for RedditClient {
    async fn fetch(&self, username: &str, limit: usize) -> Result<UserActivity, FetchError> {
        if limit == 0 {
            return Ok(UserActivity::default());
        }

        let token = self.access_token().await?;

        let posts = self
            .listing::<RawSubmission>(&token, username, "submitted", limit)
            .await?
            .into_iter()
            .map(PostRecord::from)
            .collect();
        let comments = self
            .listing::<RawComment>(&token, username, "comments", limit)
            .await?
            .into_iter()
            .map(CommentRecord::from)
            .collect();

        Ok(UserActivity { posts, comments })
    }
}

/// Extracts a username from a profile URL (`https://www.reddit.com/user/NAME/`),
/// a `u/NAME` reference, or a bare name.
///
/// When the path has a `user` or `u` segment, the name is the segment right after it.
pub fn extract_username(input: &str) -> Result<String, AppError> {
    let path = input.split(['?', '#']).next().unwrap_or_default().trim();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let username = match segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("user") || s.eq_ignore_ascii_case("u"))
    {
        Some(marker) => segments.get(marker + 1).copied().unwrap_or_default(),
        None => segments.last().copied().unwrap_or_default(),
    };

    if username.is_empty() {
        return Err(AppError::Validation(format!(
            "Could not extract a Reddit username from '{input}'"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(format!(
            "'{username}' is not a valid Reddit username"
        )));
    }
    Ok(username.to_string())
}
