use crate::error::ThinkerError;
use std::env;
use std::fs;
use std::path::Path;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Scan a `KEY=VALUE` file for `key`. Blank lines and `#` comments are
/// skipped; the first matching key wins. An unreadable file yields `None`.
fn read_value_from_env_file(path: &Path, key: &str) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    for line in raw.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((current_key, value)) = line.split_once('=') else {
            continue;
        };
        if current_key.trim() == key {
            return Some(value.trim().to_string());
        }
    }
    None
}

pub fn resolve_api_key_with<F>(lookup: F, env_path: Option<&Path>) -> Result<String, ThinkerError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(API_KEY_VAR).filter(|v| !v.is_empty()) {
        return Ok(value);
    }
    if let Some(path) = env_path
        && let Some(value) = read_value_from_env_file(path, API_KEY_VAR)
        && !value.is_empty()
    {
        return Ok(value);
    }
    Err(ThinkerError::CredentialNotFound)
}

pub fn resolve_api_key(env_path: Option<&Path>) -> Result<String, ThinkerError> {
    resolve_api_key_with(|var| env::var(var).ok(), env_path)
}
