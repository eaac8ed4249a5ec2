use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "omsctl.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub page_size: usize,
    pub request_timeout_secs: u64,
    pub suggest_timeout_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost/api".into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            suggest_timeout_ms: 2000,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn suggest_timeout(&self) -> Duration {
        Duration::from_millis(self.suggest_timeout_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    page_size: Option<usize>,
    request_timeout_secs: Option<u64>,
    suggest_timeout_ms: Option<u64>,
    log: Option<String>,
}

/// Defaults, then `path` when it exists, then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    validate(&settings)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.suggest_timeout_ms {
        settings.suggest_timeout_ms = v;
    }
    if let Some(v) = file_cfg.log {
        settings.log_filter = v;
    }
    Ok(())
}

/// `APP__*` names win over the short `OMS_*` ones.
fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let pick = |short: &str, long: &str| lookup(long).or_else(|| lookup(short));

    if let Some(v) = pick("OMS_API_URL", "APP__API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = pick("OMS_PAGE_SIZE", "APP__PAGE_SIZE") {
        settings.page_size = v
            .parse()
            .with_context(|| format!("page size '{v}' is not a number"))?;
    }
    if let Some(v) = pick("OMS_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("request timeout '{v}' is not a number"))?;
    }
    if let Some(v) = pick("OMS_SUGGEST_TIMEOUT_MS", "APP__SUGGEST_TIMEOUT_MS") {
        settings.suggest_timeout_ms = v
            .parse()
            .with_context(|| format!("suggest timeout '{v}' is not a number"))?;
    }
    if let Some(v) = pick("OMS_LOG", "APP__LOG") {
        settings.log_filter = v;
    }
    Ok(())
}

pub fn validate(settings: &Settings) -> anyhow::Result<()> {
    parse_api_url(&settings.api_url)?;
    if settings.page_size == 0 {
        bail!("page size must be a positive integer");
    }
    if settings.request_timeout_secs == 0 {
        bail!("request timeout must be at least one second");
    }
    Ok(())
}

pub fn parse_api_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url '{raw}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
