use std::{fs, path::Path, str::FromStr, time::Duration};

use serde::Deserialize;
use shared::domain::FeedMode;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub subject_id: i64,
    pub mode: FeedMode,
    pub batch_limit: usize,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            subject_id: 1,
            mode: FeedMode::Matcha,
            batch_limit: 10,
            request_timeout_seconds: 10,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    subject_id: Option<i64>,
    mode: Option<String>,
    batch_limit: Option<usize>,
    request_timeout_seconds: Option<u64>,
}

/// Defaults, then the TOML file at `path` if it exists, then environment
/// variables.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_settings(&mut settings, &raw),
        Err(err) => debug!(path = %path.display(), error = %err, "config: no settings file"),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings.api_url = normalize_api_url(&settings.api_url);
    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "config: ignoring malformed settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.subject_id {
        settings.subject_id = v;
    }
    if let Some(v) = file_cfg.mode {
        set_parsed(&mut settings.mode, "mode", &v);
    }
    if let Some(v) = file_cfg.batch_limit {
        settings.batch_limit = v;
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout_seconds = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["GROUNDS_API_URL", "APP__API_URL"] {
        if let Some(v) = lookup(key) {
            settings.api_url = v;
        }
    }
    for key in ["GROUNDS_SUBJECT_ID", "APP__SUBJECT_ID"] {
        if let Some(v) = lookup(key) {
            set_parsed(&mut settings.subject_id, key, &v);
        }
    }
    for key in ["GROUNDS_MODE", "APP__MODE"] {
        if let Some(v) = lookup(key) {
            set_parsed(&mut settings.mode, key, &v);
        }
    }
    if let Some(v) = lookup("APP__BATCH_LIMIT") {
        set_parsed(&mut settings.batch_limit, "APP__BATCH_LIMIT", &v);
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        set_parsed(
            &mut settings.request_timeout_seconds,
            "APP__REQUEST_TIMEOUT_SECONDS",
            &v,
        );
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, key: &str, raw: &str) {
    match raw.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(key, value = raw, "config: ignoring unparseable override"),
    }
}

pub fn normalize_api_url(raw_api_url: &str) -> String {
    let raw_api_url = raw_api_url.trim();

    if raw_api_url.is_empty() {
        return DEFAULT_API_URL.to_string();
    }

    let with_scheme = if raw_api_url.contains("://") {
        raw_api_url.to_string()
    } else {
        format!("http://{raw_api_url}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
