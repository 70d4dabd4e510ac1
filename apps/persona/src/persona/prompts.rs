//! All LLM prompt constants for persona synthesis.

/// System prompt for persona synthesis, enforces JSON-only output.
pub const PERSONA_SYSTEM: &str = "You are an expert user researcher who writes vivid, \
    evidence-based user personas from public social media activity. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT invent quotes that are not present in the activity provided.";

/// Persona prompt template.
/// Replace: {username}, {posts_json}, {comments_json}
pub const PERSONA_PROMPT_TEMPLATE: &str = r#"You are tasked with writing a detailed and expressive user persona from a Reddit user's public posts and comments.

Below is activity from Reddit user u/{username}. Analyze their behavioral signals and write a narrative-style persona covering:

1. Name & Archetype: suggest a persona name (a made-up one is fine) and a Jungian-style archetype (The Creator, The Seeker, The Sage, ...).
2. Basic Demographics: age range, likely location, occupation guess, and anything that points to lifestyle or social status.
3. Personality: describe the personality in natural language, including an MBTI-style guess.
4. Writing Style: tone, slang, humor, verbosity, spelling, grammar, sentence structure.
5. Habits & Behavior: do they post more than comment? What themes recur?
6. Motivations: what drives this person to post and engage?
7. Frustrations: what annoys them or comes through as a pain point?
8. Interests & Communities: hobbies, fandoms and the subreddits they are active in.
9. Citations: at least 5 short quotes (1-2 sentences) from the posts or comments below, each with its subreddit and link, that justify your conclusions.

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Marcus Lane",
  "archetype": "The Seeker",
  "demographics": {
    "age_range": "25-34",
    "location": "Toronto, Canada",
    "occupation": "Junior UX designer",
    "lifestyle": "Renting downtown, bikes to work"
  },
  "personality": {
    "description": "Curious and self-deprecating. Quick to help strangers",
    "mbti": "INFP"
  },
  "writing_style": {
    "tone": "Casual and dry",
    "expression": "Short sentences, lowercase, frequent sarcasm"
  },
  "habits": "Comments far more than he posts, mostly late at night",
  "interests": ["Typography", "Urban cycling"],
  "subreddits": ["design", "bicycling"],
  "motivations": ["Being recognized for craft", "Helping beginners"],
  "frustrations": ["Vague client feedback", "Car-centric city planning"],
  "citations": [
    {"quote": "Kerning is not optional.", "subreddit": "design", "url": "https://www.reddit.com/r/design/comments/..."}
  ]
}

HARD RULES:
1. "interests", "subreddits", "motivations" and "frustrations" MUST be JSON arrays of strings, even with a single item
2. Every citation quote MUST come from the activity below, with its real subreddit and link
3. Use "Unknown" for anything the activity gives no signal about
4. Output valid JSON ONLY: no markdown, no bullet points, no explanation

Reddit Posts:
{posts_json}

Reddit Comments:
{comments_json}"#;
