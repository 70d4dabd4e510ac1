//! Persona persistence: one pretty-printed JSON file per username.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::AppError;
use crate::persona::models::Persona;
use crate::persona::normalizer::normalize_stored;

/// `<dir>/<username>_persona.<ext>`
pub fn persona_path(dir: &Path, username: &str, ext: &str) -> PathBuf {
    dir.join(format!("{username}_persona.{ext}"))
}

/// Writes the persona to `<data_dir>/<username>_persona.json`, replacing any earlier file.
pub fn save_persona(data_dir: &Path, username: &str, persona: &Persona) -> Result<PathBuf, AppError> {
    fs::create_dir_all(data_dir).map_err(|e| AppError::storage(data_dir, e))?;

    let path = persona_path(data_dir, username, "json");
    let json = serde_json::to_string_pretty(persona)?;
    fs::write(&path, json).map_err(|e| AppError::storage(&path, e))?;

    info!("Persona saved to {}", path.display());
    Ok(path)
}

/// Loads a persisted persona and runs it back through the normalizer.
pub fn load_persona(data_dir: &Path, username: &str) -> Result<Persona, AppError> {
    let path = persona_path(data_dir, username, "json");
    info!("Loading persona data from {}", path.display());

    let contents = fs::read_to_string(&path).map_err(|e| AppError::storage(&path, e))?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    normalize_stored(value)
}

/// Writes a rendered artifact under `dir`, creating the directory if needed.
pub fn write_output(dir: &Path, username: &str, ext: &str, contents: &[u8]) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::storage(dir, e))?;
    let path = persona_path(dir, username, ext);
    fs::write(&path, contents).map_err(|e| AppError::storage(&path, e))?;
    Ok(path)
}
