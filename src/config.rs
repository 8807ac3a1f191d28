use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "listing.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.shikala.com".into(),
            access_token: None,
            refresh_token: None,
            request_timeout_secs: 30,
            user_agent: concat!("device-listing/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load settings from the config file (if any) and then the environment.
///
/// An explicitly requested file must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut settings = match fs::read_to_string(&file) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("invalid config file {}", file.display()))?,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", file.display()));
        }
    };

    apply_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    toml::from_str(raw).context("failed to parse settings")
}

fn apply_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("LISTING_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("LISTING_ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = lookup("LISTING_REFRESH_TOKEN") {
        settings.refresh_token = Some(v);
    }
    if let Some(v) = lookup("LISTING_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("LISTING_TIMEOUT_SECS must be a number, got '{}'", v))?;
    }
    settings.api_base_url = settings.api_base_url.trim_end_matches('/').to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_fill_missing_keys_with_defaults() {
        let settings = parse_settings(
            r#"
api_base_url = "http://localhost:8000/"
access_token = "abc"
"#,
        )
        .expect("parse");

        assert_eq!(settings.api_base_url, "http://localhost:8000/");
        assert_eq!(settings.access_token.as_deref(), Some("abc"));
        assert_eq!(settings.refresh_token, None);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut settings = parse_settings(r#"api_base_url = "http://file""#).expect("parse");
        apply_overrides(
            &mut settings,
            lookup(&[
                ("LISTING_API_URL", "http://env/"),
                ("LISTING_REFRESH_TOKEN", "r1"),
                ("LISTING_TIMEOUT_SECS", "5"),
            ]),
        )
        .expect("overrides");

        assert_eq!(settings.api_base_url, "http://env");
        assert_eq!(settings.refresh_token.as_deref(), Some("r1"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_override_is_reported() {
        let mut settings = Settings::default();
        let err = apply_overrides(&mut settings, lookup(&[("LISTING_TIMEOUT_SECS", "soon")]))
            .expect_err("must fail");
        assert!(err.to_string().contains("LISTING_TIMEOUT_SECS"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/listing.toml"))).expect_err("must fail");
        assert!(err.to_string().contains("failed to read"));
    }
}
