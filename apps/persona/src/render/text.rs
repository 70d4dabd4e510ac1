//! Plain-text persona report.
//!
//! Fixed section order. Missing leaves print `N/A`; list items print as `- item`.

use crate::persona::models::{Citation, Persona, PersonaProfile};

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNPARSED_HEADER: &str = "UNPARSED PERSONA (model response was not valid JSON)";

/// Renders any persona to a text report.
pub fn render_text(username: &str, persona: &Persona) -> String {
    match persona {
        Persona::Structured(profile) => render_profile(username, profile),
        Persona::Fallback(fallback) => format!(
            "{UNPARSED_HEADER}\nRaw response for u/{username}:\n\n{}\n",
            fallback.raw_response
        ),
    }
}

fn render_profile(username: &str, profile: &PersonaProfile) -> String {
    let title = format!("Reddit User Persona: u/{username}");
    let mut lines = vec![title.clone(), "=".repeat(title.len()), String::new()];

    lines.push(format!("Name: {}", or_na(&profile.name)));
    lines.push(format!("Archetype: {}", or_na(&profile.archetype)));

    let demographics = profile.demographics.clone().unwrap_or_default();
    section(&mut lines, "Basic Demographics");
    lines.push(field("Age range", &demographics.age_range));
    lines.push(field("Location", &demographics.location));
    lines.push(field("Occupation", &demographics.occupation));
    lines.push(field("Lifestyle", &demographics.lifestyle));

    let personality = profile.personality.clone().unwrap_or_default();
    section(&mut lines, "Personality");
    lines.push(field("Description", &personality.description));
    lines.push(field("MBTI", &personality.mbti));

    let writing_style = profile.writing_style.clone().unwrap_or_default();
    section(&mut lines, "Writing Style");
    lines.push(field("Tone", &writing_style.tone));
    lines.push(field("Expression", &writing_style.expression));

    section(&mut lines, "Habits & Behavior");
    lines.push(format!("  {}", or_na(&profile.habits)));

    section(&mut lines, "Interests");
    bullets(&mut lines, profile.interests.iter().cloned());

    section(&mut lines, "Active Subreddits");
    bullets(&mut lines, profile.subreddits.iter().map(|s| subreddit_label(s)));

    section(&mut lines, "Motivations");
    bullets(&mut lines, profile.motivations.iter().cloned());

    section(&mut lines, "Frustrations");
    bullets(&mut lines, profile.frustrations.iter().cloned());

    section(&mut lines, "Citations");
    if profile.citations.is_empty() {
        lines.push(NOT_AVAILABLE.to_string());
    }
    for (index, citation) in profile.citations.iter().enumerate() {
        citation_block(&mut lines, index + 1, citation);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn section(lines: &mut Vec<String>, heading: &str) {
    lines.push(String::new());
    lines.push(heading.to_string());
}

fn field(label: &str, value: &Option<String>) -> String {
    format!("  {label}: {}", or_na(value))
}

fn bullets(lines: &mut Vec<String>, items: impl Iterator<Item = String>) {
    let before = lines.len();
    lines.extend(items.map(|item| format!("- {item}")));
    if lines.len() == before {
        lines.push(NOT_AVAILABLE.to_string());
    }
}

/// `r/name`, without doubling a prefix the model already wrote.
pub fn subreddit_label(name: &str) -> String {
    let bare = name
        .trim()
        .trim_start_matches('/')
        .trim_start_matches("r/");
    format!("r/{bare}")
}

fn citation_block(lines: &mut Vec<String>, number: usize, citation: &Citation) {
    lines.push(format!("[{number}] \"{}\"", or_na(&citation.quote)));
    let subreddit = citation
        .subreddit
        .as_deref()
        .map(subreddit_label)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    lines.push(format!("    Subreddit: {subreddit}"));
    lines.push(format!("    URL: {}", or_na(&citation.url)));
}
