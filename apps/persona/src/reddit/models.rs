use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submission authored by the user. Field names match what the prompt embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub subreddit: String,
    pub score: i64,
    pub created_utc: DateTime<Utc>,
    pub text: String,
    pub url: String,
}

/// A comment authored by the user. `link` is the absolute permalink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub body: String,
    pub subreddit: String,
    pub score: i64,
    pub created_utc: DateTime<Utc>,
    pub link: String,
}

/// Everything fetched for one user, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserActivity {
    pub posts: Vec<PostRecord>,
    pub comments: Vec<CommentRecord>,
}

impl UserActivity {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.comments.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reddit listing wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSubmission {
    pub title: String,
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub body: String,
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
    pub permalink: String,
}

const REDDIT_BASE_URL: &str = "https://www.reddit.com";

fn timestamp(created_utc: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(created_utc as i64, 0).unwrap_or_default()
}

impl From<RawSubmission> for PostRecord {
    fn from(raw: RawSubmission) -> Self {
        PostRecord {
            title: raw.title,
            subreddit: raw.subreddit,
            score: raw.score,
            created_utc: timestamp(raw.created_utc),
            text: raw.selftext,
            url: raw.url,
        }
    }
}

impl From<RawComment> for CommentRecord {
    fn from(raw: RawComment) -> Self {
        CommentRecord {
            body: raw.body,
            subreddit: raw.subreddit,
            score: raw.score,
            created_utc: timestamp(raw.created_utc),
            link: format!("{REDDIT_BASE_URL}{}", raw.permalink),
        }
    }
}
