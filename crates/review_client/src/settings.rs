use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::domain::InstanceIndex;
use url::Url;

use crate::{
    locale::Locale,
    session::{SessionContext, SessionOptions},
};

pub const DEFAULT_CONFIG_FILE: &str = "reviewer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub evaluator: String,
    pub start_index: u64,
    pub locale: Locale,
    pub notice_timeout_ms: u64,
    pub session_cookie: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            evaluator: String::new(),
            start_index: 0,
            locale: Locale::En,
            notice_timeout_ms: 5_000,
            session_cookie: None,
        }
    }
}

/// Keys accepted in the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub server_url: Option<String>,
    pub evaluator: Option<String>,
    pub start_index: Option<u64>,
    pub locale: Option<Locale>,
    pub notice_timeout_ms: Option<u64>,
    pub session_cookie: Option<String>,
}

/// Reads defaults, then the config file, then environment overrides.
///
/// A missing default file is fine; a missing file that was asked for
/// explicitly is an error.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

impl ClientSettings {
    pub fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.evaluator {
            self.evaluator = v;
        }
        if let Some(v) = file_cfg.start_index {
            self.start_index = v;
        }
        if let Some(v) = file_cfg.locale {
            self.locale = v;
        }
        if let Some(v) = file_cfg.notice_timeout_ms {
            self.notice_timeout_ms = v;
        }
        if let Some(v) = file_cfg.session_cookie {
            self.session_cookie = Some(v);
        }
    }

    /// Applies `REVIEWER_*` variables, then their `APP__*` aliases.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        for key in ["REVIEWER_SERVER_URL", "APP__SERVER_URL"] {
            if let Some(v) = lookup(key) {
                self.server_url = v;
            }
        }
        for key in ["REVIEWER_EVALUATOR", "APP__EVALUATOR"] {
            if let Some(v) = lookup(key) {
                self.evaluator = v;
            }
        }
        for key in ["REVIEWER_START_INDEX", "APP__START_INDEX"] {
            if let Some(v) = lookup(key) {
                self.start_index = v
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a non-negative integer, got '{v}'"))?;
            }
        }
        for key in ["REVIEWER_LOCALE", "APP__LOCALE"] {
            if let Some(v) = lookup(key) {
                self.locale = v.parse().with_context(|| format!("invalid {key}"))?;
            }
        }
        for key in ["REVIEWER_NOTICE_TIMEOUT_MS", "APP__NOTICE_TIMEOUT_MS"] {
            if let Some(v) = lookup(key) {
                self.notice_timeout_ms = v
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be milliseconds, got '{v}'"))?;
            }
        }
        for key in ["REVIEWER_SESSION_COOKIE", "APP__SESSION_COOKIE"] {
            if let Some(v) = lookup(key) {
                self.session_cookie = Some(v);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.evaluator.trim().is_empty() {
            bail!("evaluator identity is required (set --evaluator, REVIEWER_EVALUATOR or `evaluator` in the config file)");
        }
        Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        Ok(())
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_timeout_ms)
    }

    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            start_index: InstanceIndex(self.start_index),
            evaluator: self.evaluator.clone(),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            locale: self.locale,
            notice_timeout: self.notice_timeout(),
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
