use crate::error::ThinkerError;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkerConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub trace: bool,
}

impl Default for ThinkerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            trace: false,
        }
    }
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn parse_bool(raw: &str, fallback: bool) -> bool {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "on" => true,
        "0" | "false" | "FALSE" | "no" | "off" => false,
        _ => fallback,
    }
}

fn validate(cfg: &ThinkerConfig) -> Result<(), ThinkerError> {
    if !(cfg.api_base_url.starts_with("http://") || cfg.api_base_url.starts_with("https://")) {
        return Err(ThinkerError::Config(format!(
            "GEMINI_API_BASE_URL must be an http(s) URL, got `{}`",
            cfg.api_base_url
        )));
    }
    if cfg.request_timeout_secs == 0 {
        return Err(ThinkerError::Config(
            "THINKER_REQUEST_TIMEOUT_SECS must be >= 1".to_string(),
        ));
    }
    Ok(())
}

impl ThinkerConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ThinkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(base) = non_empty(&lookup, "GEMINI_API_BASE_URL") {
            cfg.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty(&lookup, "THINKER_REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = raw.parse::<u64>().map_err(|_| {
                ThinkerError::Config(format!(
                    "THINKER_REQUEST_TIMEOUT_SECS must be an integer, got `{raw}`"
                ))
            })?;
        }
        if let Some(raw) = non_empty(&lookup, "THINKER_TRACE") {
            cfg.trace = parse_bool(&raw, cfg.trace);
        }

        validate(&cfg)?;
        Ok(cfg)
    }
}

pub fn load_config() -> Result<ThinkerConfig, ThinkerError> {
    ThinkerConfig::from_lookup(|var| env::var(var).ok())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_API_BASE_URL, ThinkerConfig};
    use crate::error::ThinkerError;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = ThinkerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.request_timeout_secs, 45);
        assert!(!cfg.trace);
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let cfg = ThinkerConfig::from_lookup(lookup(&[(
            "GEMINI_API_BASE_URL",
            "http://127.0.0.1:8080/v1beta/",
        )]))
        .expect("config");
        assert_eq!(cfg.api_base_url, "http://127.0.0.1:8080/v1beta");
    }

    #[test]
    fn rejects_zero_timeout_and_bad_scheme() {
        let err = ThinkerConfig::from_lookup(lookup(&[("THINKER_REQUEST_TIMEOUT_SECS", "0")]))
            .expect_err("zero timeout");
        assert!(matches!(err, ThinkerError::Config(_)));

        let err = ThinkerConfig::from_lookup(lookup(&[("GEMINI_API_BASE_URL", "ftp://x")]))
            .expect_err("bad scheme");
        assert!(matches!(err, ThinkerError::Config(_)));
    }

    #[test]
    fn trace_flag_accepts_common_truthy_values() {
        let cfg = ThinkerConfig::from_lookup(lookup(&[("THINKER_TRACE", "yes")])).expect("config");
        assert!(cfg.trace);
    }
}
