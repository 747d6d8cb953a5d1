use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_API_URL: &str = "https://studyhub-backend.onrender.com/api";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Delay before leaving an auth form after a successful submit.
pub(crate) const AUTH_REDIRECT_DELAY_MS: u32 = 800;
/// Delay before sending a visitor without a session to the login page.
pub(crate) const GUARD_REDIRECT_DELAY_MS: u32 = 1000;
pub(crate) const SESSION_EXPIRED_REDIRECT_DELAY_MS: u32 = 1200;
pub(crate) const LOGOUT_REDIRECT_DELAY_MS: u32 = 1000;
pub(crate) const TOAST_LIFETIME_MS: u32 = 4000;
pub(crate) const AVATAR_SAVE_DELAY_MS: u32 = 1500;

/// Runtime configuration injected by the hosting page through `window.ENV`.
///
/// Both the upper-case (`API_URL`, `LOG_LEVEL`) and lower-case (`api_url`,
/// `log_level`) spellings are accepted; upper-case wins when both are set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self::fallback();

        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return config;
        };

        let read = |keys: &[&str]| {
            keys.iter().find_map(|k| {
                js_sys::Reflect::get(&env, &(*k).into())
                    .ok()
                    .and_then(|v| v.as_string())
            })
        };

        if let Some(url) = read(&["API_URL", "api_url"]) {
            config.api_url = normalize_base_url(&url);
        }
        if let Some(level) = read(&["LOG_LEVEL", "log_level"]) {
            config.log_level = level;
        }

        config
    }

    pub fn fallback() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips trailing slashes so paths can be appended with `format!("{base}{path}")`.
pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
