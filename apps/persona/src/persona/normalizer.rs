//! Response normalizer: turns a raw completion (or a stored profile) into a `Persona`.
//!
//! Parsed: the text is a JSON object. It is migrated from the legacy nested
//! schema if needed, its list fields are coerced, and it is bound to `PersonaProfile`.
//! Unparsed: anything else becomes a `FallbackProfile` holding the raw text.

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::strip_json_fences;
use crate::persona::models::{value_to_text, FallbackProfile, Persona, PersonaProfile};

/// Fields that must always be a sequence of strings.
pub const LIST_FIELDS: [&str; 4] = ["interests", "subreddits", "motivations", "frustrations"];

/// Canonical groups whose inner keys are snake_case too.
const GROUP_KEYS: [&str; 3] = ["demographics", "personality", "writing_style"];

/// The only key of a fallback profile.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// Normalizes a model completion. Never fails: unparseable text becomes a fallback.
pub fn normalize_completion(completion: &str) -> Persona {
    let raw = completion.trim();

    match serde_json::from_str::<Value>(strip_json_fences(raw)) {
        Ok(Value::Object(map)) => match bind_profile(map) {
            Ok(profile) => Persona::Structured(profile),
            Err(e) => {
                warn!("Model JSON did not fit the persona schema ({e}). Saving raw response.");
                fallback(raw)
            }
        },
        Ok(_) => {
            warn!("Model returned JSON that is not an object. Saving raw response.");
            fallback(raw)
        }
        Err(_) => {
            warn!("Model returned non-JSON content. Saving raw response.");
            fallback(raw)
        }
    }
}

/// Normalizes a previously persisted profile, in either schema.
pub fn normalize_stored(value: Value) -> Result<Persona, AppError> {
    let Value::Object(map) = value else {
        return Err(AppError::Validation(
            "Stored persona is not a JSON object".to_string(),
        ));
    };

    if map.len() == 1 {
        if let Some(Value::String(raw)) = map.get(RAW_RESPONSE_KEY) {
            return Ok(fallback(raw));
        }
    }

    Ok(Persona::Structured(bind_profile(map)?))
}

/// Migrates, coerces and binds a JSON object.
pub fn bind_profile(mut map: Map<String, Value>) -> Result<PersonaProfile, serde_json::Error> {
    migrate_legacy(&mut map);
    coerce_list_fields(&mut map);
    serde_json::from_value(Value::Object(map))
}

/// Wraps a bare string in any of `LIST_FIELDS` into a one-element sequence.
/// Values that are already sequences are left untouched.
pub fn coerce_list_fields(map: &mut Map<String, Value>) {
    for key in LIST_FIELDS {
        if let Some(value) = map.get_mut(key) {
            if value.is_string() {
                let single = value.take();
                *value = Value::Array(vec![single]);
            }
        }
    }
}

fn fallback(raw: &str) -> Persona {
    Persona::Fallback(FallbackProfile {
        raw_response: raw.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy schema migration
// ────────────────────────────────────────────────────────────────────────────

/// Rewrites the title-case nested schema ("Basic Demographics", "Motivations" →
/// "Driving Factors", ...) and older flat aliases into canonical keys.
/// Any other key that is only a case or spacing variant of a snake_case key is
/// renamed to it. Canonical keys that are already present win.
pub fn migrate_legacy(map: &mut Map<String, Value>) {
    if let Some(subreddits) = map.remove("favorite_subreddits") {
        insert_missing(map, "subreddits", subreddits);
    }
    if let Some(traits) = map.remove("traits") {
        if let Some(description) = value_to_sentences(&traits) {
            merge_into_group(map, "personality", "description", Value::String(description));
        }
    }

    if let Some(combined) = map.remove("Name & Archetype") {
        if let Some(name) = lookup(&combined, &["Name"]) {
            insert_missing(map, "name", name);
        }
        if let Some(archetype) = lookup(&combined, &["Archetype"]) {
            insert_missing(map, "archetype", archetype);
        }
    }
    if let Some(name) = map.remove("Name") {
        insert_missing(map, "name", name);
    }
    if let Some(archetype) = map.remove("Archetype") {
        insert_missing(map, "archetype", archetype);
    }

    if let Some(group) = map.remove("Basic Demographics") {
        for (legacy, canonical) in [
            (&["Age", "Age Range"][..], "age_range"),
            (&["Location"][..], "location"),
            (&["Occupation"][..], "occupation"),
            (&["Lifestyle", "Social Status"][..], "lifestyle"),
        ] {
            if let Some(value) = lookup(&group, legacy) {
                merge_into_group(map, "demographics", canonical, value);
            }
        }
    }

    if let Some(group) = map.remove("Personality & Traits") {
        match lookup(&group, &["Description"]) {
            Some(description) => merge_into_group(map, "personality", "description", description),
            None if group.is_string() => merge_into_group(map, "personality", "description", group.clone()),
            None => {}
        }
        if let Some(mbti) = lookup(&group, &["MBTI"]) {
            merge_into_group(map, "personality", "mbti", mbti);
        }
    }

    if let Some(group) = map.remove("Writing Style") {
        match lookup(&group, &["Expression", "Description"]) {
            Some(expression) => merge_into_group(map, "writing_style", "expression", expression),
            None if group.is_string() => merge_into_group(map, "writing_style", "expression", group.clone()),
            None => {}
        }
        if let Some(tone) = lookup(&group, &["Tone"]) {
            merge_into_group(map, "writing_style", "tone", tone);
        }
    }

    if let Some(group) = map.remove("Habits & Behavior") {
        if let Some(habits) = value_to_text(&group) {
            insert_missing(map, "habits", Value::String(habits));
        }
    }

    if let Some(group) = map.remove("Interests & Communities") {
        if let Some(interests) = lookup(&group, &["Interests", "Hobbies"]) {
            insert_missing(map, "interests", interests);
        }
        if let Some(subreddits) = lookup(&group, &["Active Subreddits", "Subreddits"]) {
            insert_missing(map, "subreddits", subreddits);
        }
    }

    if let Some(group) = map.remove("Motivations") {
        insert_missing(map, "motivations", unwrap_group(group, &["Driving Factors"]));
    }
    if let Some(group) = map.remove("Frustrations") {
        insert_missing(map, "frustrations", unwrap_group(group, &["Challenges"]));
    }

    adopt_loose_keys(map);
    for group in GROUP_KEYS {
        if let Some(Value::Object(inner)) = map.get_mut(group) {
            adopt_loose_keys(inner);
        }
    }
}

/// Moves keys that only differ from a snake_case key by case or spacing
/// ("Interests", "Writing Style", "Age Range") onto that key, unless it is already set.
fn adopt_loose_keys(map: &mut Map<String, Value>) {
    let loose: Vec<(String, String)> = map
        .keys()
        .filter_map(|key| {
            let snake = to_snake_case(key);
            (snake != *key).then(|| (key.clone(), snake))
        })
        .collect();

    for (key, snake) in loose {
        if let Some(value) = map.remove(&key) {
            insert_missing(map, &snake, value);
        }
    }
}

fn to_snake_case(key: &str) -> String {
    key.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Case-insensitive lookup of the first matching key in a JSON object.
fn lookup(group: &Value, names: &[&str]) -> Option<Value> {
    let object = group.as_object()?;
    names.iter().find_map(|name| {
        object
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_null())
            .map(|(_, value)| value.clone())
    })
}

/// Picks the named inner field of a legacy group, or flattens the group's values.
fn unwrap_group(group: Value, names: &[&str]) -> Value {
    if let Some(inner) = lookup(&group, names) {
        return inner;
    }
    match group {
        Value::Object(object) => Value::Array(
            object
                .values()
                .filter_map(value_to_text)
                .map(Value::String)
                .collect(),
        ),
        other => other,
    }
}

fn value_to_sentences(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            (!parts.is_empty()).then(|| parts.join(". "))
        }
        other => value_to_text(other),
    }
}

fn insert_missing(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get(key) {
        Some(existing) if !existing.is_null() => {}
        _ => {
            map.insert(key.to_string(), value);
        }
    }
}

fn merge_into_group(map: &mut Map<String, Value>, group: &str, key: &str, value: Value) {
    let entry = map
        .entry(group.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(inner) = entry {
        insert_missing(inner, key, value);
    }
}
