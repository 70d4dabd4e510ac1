//! Prompt builder: embeds a bounded slice of the user's activity into the persona prompt.

use crate::errors::AppError;
use crate::persona::prompts::PERSONA_PROMPT_TEMPLATE;
use crate::reddit::{CommentRecord, PostRecord};

/// At most this many posts and this many comments are sent to the model.
pub const MAX_PROMPT_RECORDS: usize = 20;

/// Builds the persona prompt. Empty inputs still yield both sections, as `[]`.
pub fn build_persona_prompt(
    username: &str,
    posts: &[PostRecord],
    comments: &[CommentRecord],
) -> Result<String, AppError> {
    let posts = &posts[..posts.len().min(MAX_PROMPT_RECORDS)];
    let comments = &comments[..comments.len().min(MAX_PROMPT_RECORDS)];

    let posts_json = serde_json::to_string_pretty(posts)?;
    let comments_json = serde_json::to_string_pretty(comments)?;

    Ok(PERSONA_PROMPT_TEMPLATE
        .replace("{username}", username)
        .replace("{posts_json}", &posts_json)
        .replace("{comments_json}", &comments_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn posts(n: usize) -> Vec<PostRecord> {
        (0..n)
            .map(|i| PostRecord {
                title: format!("post-title-{i:03}"),
                subreddit: "rust".to_string(),
                score: i as i64,
                created_utc: at(1_700_000_000 - i as i64),
                text: "body".to_string(),
                url: format!("https://www.reddit.com/r/rust/comments/{i}"),
            })
            .collect()
    }

    fn comments(n: usize) -> Vec<CommentRecord> {
        (0..n)
            .map(|i| CommentRecord {
                body: format!("comment-body-{i:03}"),
                subreddit: "AskReddit".to_string(),
                score: 1,
                created_utc: at(1_700_000_000 - i as i64),
                link: format!("https://www.reddit.com/r/AskReddit/comments/c{i}"),
            })
            .collect()
    }

    #[test]
    fn test_empty_activity_still_embeds_both_sections() {
        let prompt = build_persona_prompt("quiet_user", &[], &[]).unwrap();
        assert!(prompt.contains("u/quiet_user"));
        assert!(prompt.contains("Reddit Posts:\n[]"));
        assert!(prompt.contains("Reddit Comments:\n[]"));
        assert!(!prompt.contains("{posts_json}"));
        assert!(!prompt.contains("{comments_json}"));
    }

    #[test]
    fn test_only_first_twenty_of_each_are_embedded() {
        let prompt = build_persona_prompt("busy_user", &posts(50), &comments(30)).unwrap();
        assert!(prompt.contains("post-title-019"));
        assert!(!prompt.contains("post-title-020"));
        assert!(prompt.contains("comment-body-019"));
        assert!(!prompt.contains("comment-body-020"));
    }

    #[test]
    fn test_prompt_spells_out_schema() {
        let prompt = build_persona_prompt("u", &posts(1), &comments(1)).unwrap();
        for key in [
            "\"name\"",
            "\"archetype\"",
            "\"demographics\"",
            "\"interests\"",
            "\"subreddits\"",
            "\"motivations\"",
            "\"frustrations\"",
            "\"citations\"",
        ] {
            assert!(prompt.contains(key), "prompt is missing {key}");
        }
        assert!(prompt.contains("\"created_utc\": \"2023-11-14T22:13:20Z\""));
    }
}
