use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use client_core::RefreshPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "rowedit.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub refresh_policy: RefreshPolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            refresh_policy: RefreshPolicy::PatchRow,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then the config file, then `APP__*` variables. An explicitly
/// named file must exist; the default one is optional.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if explicit.is_some() => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    settings.apply_env(|name| std::env::var(name).ok())?;
    Ok(settings)
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
        if let Some(v) = file_cfg.get("server_url") {
            self.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("refresh_policy") {
            self.refresh_policy = v.parse::<RefreshPolicy>()?;
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = var("APP__SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__REFRESH_POLICY") {
            self.refresh_policy = v.parse::<RefreshPolicy>().context("APP__REFRESH_POLICY")?;
        }
        if let Some(v) = var("APP__LOG_FILTER") {
            self.log_filter = v;
        } else if let Some(v) = var("RUST_LOG") {
            self.log_filter = v;
        }
        if self.server_url.trim().is_empty() {
            bail!("server url must not be empty");
        }
        Ok(())
    }
}
