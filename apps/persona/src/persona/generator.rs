//! Persona generation: orchestrates one run for one user.
//!
//! Flow: fetch activity → build prompt → LLM completion → normalize →
//!       persist JSON → write text report.
//!
//! Strictly sequential. A fetch fault yields empty input and a parse fault
//! yields a fallback persona; any other fault ends the run.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::CompletionProvider;
use crate::persona::builder::build_persona_prompt;
use crate::persona::models::Persona;
use crate::persona::normalizer::normalize_completion;
use crate::persona::prompts::PERSONA_SYSTEM;
use crate::persona::storage::save_persona;
use crate::reddit::{fetch_user_activity, UserActivity};
use crate::render::write_text_report;
use crate::state::AppContext;

/// Output of a completed run.
#[derive(Debug, Clone)]
pub struct PersonaRun {
    pub username: String,
    pub persona: Persona,
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

/// Builds the prompt, asks the model once, and normalizes its reply.
pub async fn synthesize_persona(
    llm: &dyn CompletionProvider,
    username: &str,
    activity: &UserActivity,
) -> Result<Persona, AppError> {
    let prompt = build_persona_prompt(username, &activity.posts, &activity.comments)?;
    debug!("Persona prompt for u/{username}: {} chars", prompt.len());

    info!("Sending data to the LLM...");
    let completion = llm.complete(&prompt, PERSONA_SYSTEM).await?;

    Ok(normalize_completion(&completion))
}

/// Runs the full pipeline for `username` and persists JSON + text outputs.
pub async fn generate_persona(ctx: &AppContext, username: &str) -> Result<PersonaRun, AppError> {
    // Step 1: Fetch (never fails; faults degrade to empty input)
    info!("Scraping Reddit data for u/{username}...");
    let activity = fetch_user_activity(ctx.source.as_ref(), username, ctx.fetch_limit).await;
    if activity.is_empty() {
        info!("No activity found for u/{username}; generating from an empty history");
    }

    // Step 2: Synthesize + normalize
    info!("Generating persona for u/{username}...");
    let persona = synthesize_persona(ctx.llm.as_ref(), username, &activity).await?;

    // Step 3: Persist
    let json_path = save_persona(&ctx.config.data_dir, username, &persona)?;

    // Step 4: Text report
    let text_path = write_text_report(&ctx.config, username, &persona)?;

    Ok(PersonaRun {
        username: username.to_string(),
        persona,
        json_path,
        text_path,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::persona::storage::load_persona;
    use crate::reddit::{ActivitySource, CommentRecord, FetchError};

    struct CannedModel {
        reply: Result<String, ()>,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                last_prompt: Mutex::new(None),
            })
        }

        fn prompt(&self) -> String {
            self.last_prompt.lock().unwrap().clone().unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionProvider for CannedModel {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.reply.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    struct OneComment;

    #[async_trait]
    impl ActivitySource for OneComment {
        async fn fetch(&self, _username: &str, _limit: usize) -> Result<UserActivity, FetchError> {
            Ok(UserActivity {
                posts: vec![],
                comments: vec![CommentRecord {
                    body: "Kerning is not optional.".to_string(),
                    subreddit: "design".to_string(),
                    score: 12,
                    created_utc: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
                    link: "https://www.reddit.com/r/design/comments/k1/".to_string(),
                }],
            })
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ActivitySource for Unreachable {
        async fn fetch(&self, username: &str, _limit: usize) -> Result<UserActivity, FetchError> {
            Err(FetchError::Forbidden(username.to_string()))
        }
    }

    fn context(
        dir: &std::path::Path,
        llm: Arc<CannedModel>,
        source: Arc<dyn ActivitySource>,
    ) -> AppContext {
        AppContext {
            config: Config {
                data_dir: dir.join("data"),
                output_dir: dir.join("output"),
                template_path: None,
                wkhtmltopdf_path: "wkhtmltopdf".to_string(),
                rust_log: "info".to_string(),
            },
            llm,
            source,
            fetch_limit: 50,
        }
    }

    #[tokio::test]
    async fn test_full_run_persists_json_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let model = CannedModel::replying(
            r#"{"name": "Marcus", "archetype": "The Sage", "interests": "Typography"}"#,
        );
        let ctx = context(dir.path(), model.clone(), Arc::new(OneComment));

        let run = generate_persona(&ctx, "marcus").await.unwrap();

        assert_eq!(run.json_path, dir.path().join("data/marcus_persona.json"));
        assert_eq!(run.text_path, dir.path().join("output/marcus_persona.txt"));
        assert!(model.prompt().contains("Kerning is not optional."));

        let stored = load_persona(&ctx.config.data_dir, "marcus").unwrap();
        assert_eq!(stored, run.persona);
        assert_eq!(
            stored.as_profile().unwrap().interests,
            vec!["Typography".to_string()]
        );

        let text = std::fs::read_to_string(run.text_path).unwrap();
        assert!(text.contains("Archetype: The Sage"));
        assert!(text.contains("- Typography"));
    }

    #[tokio::test]
    async fn test_fetch_fault_still_runs_with_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let model = CannedModel::replying(r#"{"name": "Nobody"}"#);
        let ctx = context(dir.path(), model.clone(), Arc::new(Unreachable));

        let run = generate_persona(&ctx, "ghost").await.unwrap();

        assert!(!run.persona.is_fallback());
        let prompt = model.prompt();
        assert!(prompt.contains("Reddit Posts:\n[]"));
        assert!(prompt.contains("Reddit Comments:\n[]"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_persists_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let model = CannedModel::replying("I'm sorry, I can't do that.");
        let ctx = context(dir.path(), model, Arc::new(OneComment));

        let run = generate_persona(&ctx, "marcus").await.unwrap();

        assert!(run.persona.is_fallback());
        let json = std::fs::read_to_string(&run.json_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"raw_response": "I'm sorry, I can't do that."})
        );
        let text = std::fs::read_to_string(&run.text_path).unwrap();
        assert!(text.ends_with("I'm sorry, I can't do that.\n"));
    }

    #[tokio::test]
    async fn test_llm_fault_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), CannedModel::failing(), Arc::new(OneComment));

        let err = generate_persona(&ctx, "marcus").await.unwrap_err();

        assert!(matches!(err, AppError::Llm(LlmError::EmptyContent)));
        assert!(!dir.path().join("data").exists());
    }
}
