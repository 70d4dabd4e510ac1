//! Persona data model: the canonical schema every completion is normalized into.
//!
//! Binding is forgiving: scalar leaves accept strings, numbers or
//! booleans, list fields accept a bare string, and malformed citations are
//! dropped instead of failing the whole profile.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Basic demographic guesses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, deserialize_with = "lenient_string")]
    pub age_range: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lifestyle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Free-text description. The document renderer splits it into traits on `". "`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mbti: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritingStyle {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expression: Option<String>,
}

/// A short quote backing a persona claim, with where it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(
        default,
        alias = "Quote",
        alias = "snippet",
        alias = "text",
        deserialize_with = "lenient_string"
    )]
    pub quote: Option<String>,
    #[serde(
        default,
        alias = "Subreddit",
        alias = "source",
        alias = "community",
        deserialize_with = "lenient_string"
    )]
    pub subreddit: Option<String>,
    #[serde(
        default,
        alias = "URL",
        alias = "Url",
        alias = "link",
        alias = "Link",
        deserialize_with = "lenient_string"
    )]
    pub url: Option<String>,
}

/// A fully structured persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub archetype: Option<String>,
    #[serde(default, deserialize_with = "lenient_group")]
    pub demographics: Option<Demographics>,
    #[serde(default, deserialize_with = "lenient_group")]
    pub personality: Option<Personality>,
    #[serde(default, deserialize_with = "lenient_group")]
    pub writing_style: Option<WritingStyle>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub habits: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub subreddits: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub motivations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub frustrations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_citations")]
    pub citations: Vec<Citation>,
}

/// What is kept when the model's reply cannot be parsed: the reply itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackProfile {
    pub raw_response: String,
}

/// Result of normalizing a completion or a stored profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Persona {
    Structured(PersonaProfile),
    Fallback(FallbackProfile),
}

impl Persona {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Persona::Fallback(_))
    }

    pub fn as_profile(&self) -> Option<&PersonaProfile> {
        match self {
            Persona::Structured(profile) => Some(profile),
            Persona::Fallback(_) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field binding
// ────────────────────────────────────────────────────────────────────────────

/// Flattens any JSON value to display text. `null` and blank strings are missing.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(value_to_text).collect(),
        other => value_to_text(&other).into_iter().collect(),
    })
}

/// Binds a nested group. Anything that is not an object counts as missing.
fn lenient_group<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_citations<'de, D>(deserializer: D) -> Result<Vec<Citation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value::<Citation>(item).ok(),
            Value::String(quote) => Some(Citation {
                quote: value_to_text(&Value::String(quote)),
                ..Citation::default()
            }),
            _ => None,
        })
        .collect())
}
