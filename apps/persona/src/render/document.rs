//! HTML persona document, the input to PDF conversion.
//!
//! The template addresses values as `{{ slot }}`. Slots the context does not
//! supply render as an empty string.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::errors::AppError;
use crate::persona::models::{Citation, PersonaProfile};
use crate::render::text::{subreddit_label, NOT_AVAILABLE};

/// Template compiled into the binary; `PERSONA_TEMPLATE_PATH` replaces it.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/persona_template.html");

const SLOT_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// Values bound into the template.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub name: String,
    pub username: String,
    pub archetype: String,
    pub age_range: String,
    pub location_guess: String,
    pub occupation_guess: String,
    pub traits: Vec<String>,
    pub interests: Vec<String>,
    pub favorite_subreddits: Vec<String>,
    pub frustrations: String,
    pub motivations: String,
    pub writing_style: String,
    pub citations: Vec<Citation>,
}

impl DocumentContext {
    pub fn from_profile(username: &str, profile: &PersonaProfile) -> Self {
        let demographics = profile.demographics.clone().unwrap_or_default();
        let personality = profile.personality.clone().unwrap_or_default();
        let writing_style = profile.writing_style.clone().unwrap_or_default();

        let traits = personality
            .description
            .as_deref()
            .unwrap_or_default()
            .split(". ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        DocumentContext {
            name: profile.name.clone().unwrap_or_else(|| username.to_string()),
            username: username.to_string(),
            archetype: or_na(profile.archetype.clone()),
            age_range: or_na(demographics.age_range),
            location_guess: or_na(demographics.location),
            occupation_guess: or_na(demographics.occupation),
            traits,
            interests: profile.interests.clone(),
            favorite_subreddits: profile.subreddits.clone(),
            frustrations: profile.frustrations.join("; "),
            motivations: profile.motivations.join("; "),
            writing_style: or_na(writing_style.expression.or(writing_style.tone)),
            citations: profile.citations.clone(),
        }
    }

    /// Slot name → HTML fragment. Every value is escaped here.
    fn slots(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("name", escape_html(&self.name)),
            ("username", escape_html(&self.username)),
            ("archetype", escape_html(&self.archetype)),
            ("age_range", escape_html(&self.age_range)),
            ("location_guess", escape_html(&self.location_guess)),
            ("occupation_guess", escape_html(&self.occupation_guess)),
            ("traits", list_items(self.traits.iter().cloned())),
            ("interests", list_items(self.interests.iter().cloned())),
            (
                "favorite_subreddits",
                list_items(self.favorite_subreddits.iter().map(|s| subreddit_label(s))),
            ),
            ("frustrations", escape_html(&self.frustrations)),
            ("motivations", escape_html(&self.motivations)),
            ("writing_style", escape_html(&self.writing_style)),
            ("citations", citation_blocks(&self.citations)),
        ])
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Fills every `{{ slot }}` in `template` in a single pass.
pub fn render_html(template: &str, context: &DocumentContext) -> Result<String, AppError> {
    let pattern = Regex::new(SLOT_PATTERN)
        .map_err(|e| AppError::Render(format!("Invalid slot pattern: {e}")))?;
    let slots = context.slots();

    Ok(pattern
        .replace_all(template, |caps: &Captures| {
            slots.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}

fn list_items(items: impl Iterator<Item = String>) -> String {
    items
        .map(|item| format!("<li>{}</li>", escape_html(&item)))
        .collect::<Vec<String>>()
        .join("\n")
}

fn citation_blocks(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(|citation| {
            let quote = escape_html(citation.quote.as_deref().unwrap_or_default());
            let source = citation
                .subreddit
                .as_deref()
                .map(|s| escape_html(&subreddit_label(s)))
                .unwrap_or_default();
            let link = match citation.url.as_deref() {
                Some(url) => {
                    let url = escape_html(url);
                    format!(r#" <a href="{url}">{url}</a>"#)
                }
                None => String::new(),
            };
            format!(
                "<div class=\"citation\"><blockquote>&ldquo;{quote}&rdquo;</blockquote>\
                 <p class=\"source\">{source}{link}</p></div>"
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn escape_html(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            '<' => "&lt;".into(),
            '>' => "&gt;".into(),
            '&' => "&amp;".into(),
            '"' => "&quot;".into(),
            '\'' => "&#39;".into(),
            _ => ch.to_string(),
        })
        .collect::<String>()
}
