// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "sitrep";
const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
const DEFAULT_STATUS_CLEAR_AFTER: &str = "4s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub request_timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            token: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub status_clear_after: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            status_clear_after: Some(DEFAULT_STATUS_CLEAR_AFTER.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SITREP_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SITREP_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [api] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Migrate your config to the v1 schema or delete the file to start from defaults",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        let base_url = self.base_url();
        let parsed = Url::parse(base_url).map_err(|error| {
            anyhow!(
                "api.base_url in {} is not a valid URL ({base_url:?}): {error}",
                path.display()
            )
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!(
                "api.base_url in {} must use http or https, got scheme {:?}",
                path.display(),
                parsed.scheme()
            );
        }

        if let Some(timeout) = &self.api.request_timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.request_timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(delay) = &self.ui.status_clear_after {
            let parsed = parse_duration(delay)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.status_clear_after in {} must be positive, got {}",
                    path.display(),
                    delay
                );
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn token(&self) -> &str {
        self.api.token.as_deref().unwrap_or("")
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.api
                .request_timeout
                .as_deref()
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        )
    }

    pub fn status_clear_after(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .status_clear_after
                .as_deref()
                .unwrap_or(DEFAULT_STATUS_CLEAR_AFTER),
        )
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# sitrep config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# Base URL of the incident service, including any /api prefix\nbase_url = \"{}\"\n# Bearer token for the service; leave empty for anonymous access\ntoken = \"\"\nrequest_timeout = \"{}\"\n\n[ui]\n# How long transient status messages stay on screen\nstatus_clear_after = \"{}\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_REQUEST_TIMEOUT,
            DEFAULT_STATUS_CLEAR_AFTER,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 30s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(), "http://localhost:5000/api");
        assert_eq!(config.token(), "");
        assert_eq!(config.request_timeout()?, Duration::from_secs(30));
        assert_eq!(config.status_clear_after()?, Duration::from_secs(4));
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url = \"http://localhost:5000/api\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api] and [ui]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"https://sitrep.example/api\"\ntoken = \"secret\"\nrequest_timeout = \"5s\"\n[ui]\nstatus_clear_after = \"2s\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "https://sitrep.example/api");
        assert_eq!(config.token(), "secret");
        assert_eq!(config.request_timeout()?, Duration::from_secs(5));
        assert_eq!(config.status_clear_after()?, Duration::from_secs(2));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SITREP_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SITREP_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("SITREP_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("config.toml"));
        Ok(())
    }

    #[test]
    fn base_url_trims_trailing_slashes() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[api]\nbase_url = \"http://localhost:5000/api///\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "http://localhost:5000/api");
        Ok(())
    }

    #[test]
    fn base_url_must_be_a_valid_url() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\nbase_url = \"not a url\"\n")?;
        let error = Config::load(&path).expect_err("garbage base_url should fail");
        assert!(error.to_string().contains("api.base_url"));
        Ok(())
    }

    #[test]
    fn base_url_must_use_http_or_https() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[api]\nbase_url = \"ftp://sitrep.example/api\"\n")?;
        let error = Config::load(&path).expect_err("ftp base_url should fail");
        assert!(error.to_string().contains("must use http or https"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("30s")?, Duration::from_secs(30));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn non_positive_request_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"http://localhost:5000/api\"\nrequest_timeout = \"0s\"\n",
        )?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn non_positive_status_clear_delay_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nstatus_clear_after = \"0ms\"\n")?;
        let error = Config::load(&path).expect_err("zero delay should fail");
        assert!(error.to_string().contains("ui.status_clear_after"));
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[api]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("status_clear_after"));
        Ok(())
    }
}
