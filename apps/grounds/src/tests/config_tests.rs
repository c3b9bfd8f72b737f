use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_url, "http://localhost:8000");
    assert_eq!(settings.subject_id, 1);
    assert_eq!(settings.mode, FeedMode::Matcha);
    assert_eq!(settings.batch_limit, 10);
    assert_eq!(settings.request_timeout(), Duration::from_secs(10));
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
api_url = "https://grounds.example.com/api/"
subject_id = 77
mode = "coffee"
batch_limit = 4
"#,
    );

    assert_eq!(settings.api_url, "https://grounds.example.com/api/");
    assert_eq!(settings.subject_id, 77);
    assert_eq!(settings.mode, FeedMode::Coffee);
    assert_eq!(settings.batch_limit, 4);
    assert_eq!(settings.request_timeout_seconds, 10);
}

#[test]
fn malformed_file_leaves_settings_untouched() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "subject_id = \"not a number\"");
    assert_eq!(settings, Settings::default());
}

#[test]
fn unknown_mode_in_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "mode = \"tea\"\nbatch_limit = 3");
    assert_eq!(settings.mode, FeedMode::Matcha);
    assert_eq!(settings.batch_limit, 3);
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("GROUNDS_API_URL", "http://short:8000"),
            ("APP__API_URL", "http://long:9000"),
            ("GROUNDS_MODE", "coffee"),
            ("APP__SUBJECT_ID", "12"),
            ("APP__REQUEST_TIMEOUT_SECONDS", "3"),
        ]),
    );

    assert_eq!(settings.api_url, "http://long:9000");
    assert_eq!(settings.mode, FeedMode::Coffee);
    assert_eq!(settings.subject_id, 12);
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
}

#[test]
fn unparseable_env_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("APP__SUBJECT_ID", "twelve"),
            ("APP__BATCH_LIMIT", "-1"),
            ("APP__MODE", "espresso"),
        ]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn normalizes_api_urls() {
    assert_eq!(normalize_api_url("  "), "http://localhost:8000");
    assert_eq!(normalize_api_url("localhost:8000/"), "http://localhost:8000");
    assert_eq!(
        normalize_api_url("https://grounds.example.com/api/"),
        "https://grounds.example.com/api"
    );
}

#[test]
fn zero_timeout_is_raised_to_one_second() {
    let settings = Settings {
        request_timeout_seconds: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

#[test]
fn loads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("grounds_settings_test_{suffix}.toml"));
    fs::write(&path, "api_url = \"example.org:8080/\"\nbatch_limit = 6\n").expect("write");

    let settings = load_settings(&path);

    assert_eq!(settings.batch_limit, 6);
    if env::var("GROUNDS_API_URL").is_err() && env::var("APP__API_URL").is_err() {
        assert_eq!(settings.api_url, "http://example.org:8080");
    }

    fs::remove_file(path).expect("cleanup");
}
