use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};

pub const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub locale: String,
    pub country_code: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            request_timeout_ms: 10_000,
            locale: "en-US".into(),
            country_code: "US".into(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Loads settings from defaults, then `client.toml` (or `path` when given),
/// then `APP__*` environment variables.
///
/// `LANG` only replaces the default locale, so a file locale still wins.
/// A missing default file is fine; a missing explicit file is an error.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();
    if let Some(lang) = lookup("LANG").filter(|lang| !lang.trim().is_empty()) {
        settings.locale = lang;
    }

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    if file.exists() {
        let raw = fs::read_to_string(&file)
            .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", file.display()))?;
    } else if required {
        bail!("settings file '{}' does not exist", file.display());
    }

    apply_env_overrides(&mut settings, &lookup)?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;

    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("request_timeout_ms") {
        settings.request_timeout_ms = match v {
            toml::Value::Integer(ms) => u64::try_from(*ms)
                .with_context(|| format!("request_timeout_ms must not be negative: {ms}"))?,
            toml::Value::String(ms) => ms
                .parse()
                .with_context(|| format!("request_timeout_ms is not a number: '{ms}'"))?,
            other => bail!("request_timeout_ms has unexpected type: {other}"),
        };
    }
    if let Some(v) = file_cfg.get("locale").and_then(toml::Value::as_str) {
        settings.locale = v.to_string();
    }
    if let Some(v) = file_cfg.get("country_code").and_then(toml::Value::as_str) {
        settings.country_code = v.to_string();
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = v
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("APP__LOCALE") {
        settings.locale = v;
    }
    if let Some(v) = lookup("APP__COUNTRY_CODE") {
        settings.country_code = v;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
