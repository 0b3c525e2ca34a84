use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use completion::{OpenAiConfig, DEFAULT_OPENAI_BASE_URL};
use orchestrator::{DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".into(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            primary_model: DEFAULT_PRIMARY_MODEL.into(),
            fallback_model: DEFAULT_FALLBACK_MODEL.into(),
            temperature: 0.7,
        }
    }
}

impl Settings {
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            temperature: self.temperature,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = match read_settings_file(Path::new(SETTINGS_FILE)) {
        Ok(file) => file,
        Err(error) => {
            warn!(%error, "ignoring unreadable settings file");
            None
        }
    };
    settings_from_sources(file.as_deref(), |name| std::env::var(name).ok())
}

fn read_settings_file(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(Some(raw))
}

/// Defaults, then the TOML file, then environment. For each setting the `APP__`
/// variable wins over the bare one.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(error) => warn!(%error, "ignoring malformed settings file"),
        }
    }

    let pick = |bare: Option<&str>, prefixed: &str| {
        env(prefixed).or_else(|| bare.and_then(&env))
    };

    if let Some(v) = pick(Some("SERVER_BIND"), "APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = pick(Some("OPENAI_API_KEY"), "APP__OPENAI_API_KEY") {
        settings.openai_api_key = Some(v);
    }
    if let Some(v) = pick(Some("OPENAI_BASE_URL"), "APP__OPENAI_BASE_URL") {
        settings.openai_base_url = v;
    }
    if let Some(v) = pick(None, "APP__PRIMARY_MODEL") {
        settings.primary_model = v;
    }
    if let Some(v) = pick(None, "APP__FALLBACK_MODEL") {
        settings.fallback_model = v;
    }
    if let Some(v) = pick(None, "APP__TEMPERATURE") {
        match v.parse::<f32>() {
            Ok(parsed) => settings.temperature = parsed,
            Err(_) => warn!(value = %v, "ignoring unparseable APP__TEMPERATURE"),
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    let text = |key: &str| file_cfg.get(key).and_then(toml::Value::as_str).map(str::to_string);

    if let Some(v) = text("bind_addr") {
        settings.bind_addr = v;
    }
    if let Some(v) = text("openai_api_key") {
        settings.openai_api_key = Some(v);
    }
    if let Some(v) = text("openai_base_url") {
        settings.openai_base_url = v;
    }
    if let Some(v) = text("primary_model") {
        settings.primary_model = v;
    }
    if let Some(v) = text("fallback_model") {
        settings.fallback_model = v;
    }
    match file_cfg.get("temperature") {
        Some(toml::Value::Float(v)) => settings.temperature = *v as f32,
        Some(toml::Value::Integer(v)) => settings.temperature = *v as f32,
        Some(other) => warn!(value = %other, "ignoring non-numeric temperature"),
        None => {}
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
