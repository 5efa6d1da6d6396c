//! Paths and editor settings.
//!
//! `cueline.json` holds the backend location and the editor's tuning knobs.
//! Command-line flags override whatever the file says; a missing file means
//! defaults.

use crate::core::debounced_writer::DEFAULT_DEBOUNCE_MS;
use crate::core::notifications::DEFAULT_TOAST_TTL_MS;
use crate::validation::ConflictRules;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "cueline.json";
pub const LOG_FILE: &str = "cueline.log";
/// Window geometry and dock layout, written by eframe.
pub const UI_STATE_FILE: &str = "cueline_ui.ron";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (CUELINE_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var("CUELINE_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }

    /// Path to a file in the config directory.
    ///
    /// Priority:
    /// 1. CLI --config-dir argument
    /// 2. CUELINE_CONFIG_DIR environment variable
    /// 3. Local folder IF cueline.json or cueline.log exist there
    /// 4. Platform-specific config directory from dirs-next
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(dir) = &self.config_dir {
            return dir.clone();
        }

        if let Ok(current_dir) = std::env::current_dir()
            && has_local_config_files(&current_dir)
        {
            return current_dir;
        }

        if let Some(dir) = dirs_next::config_dir() {
            return dir.join("cueline");
        }

        PathBuf::from(".")
    }

    pub fn ensure_dir(&self) -> Result<()> {
        let dir = self.config_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

fn has_local_config_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

/// Invalid values in an otherwise parseable settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyApiUrl,
    BadApiUrl(String),
    EmptyWebinar,
    NegativeTolerance(&'static str, f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyApiUrl => write!(f, "api_url is empty"),
            ConfigError::BadApiUrl(url) => write!(f, "api_url is not an http(s) URL: {}", url),
            ConfigError::EmptyWebinar => write!(f, "webinar id is empty"),
            ConfigError::NegativeTolerance(name, v) => write!(f, "{} must be >= 0, got {}", name, v),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Persisted editor settings (`cueline.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub api_url: String,
    pub webinar: String,
    pub debounce_ms: u64,
    /// Seconds
    pub collision_tolerance: f64,
    /// Seconds between pause-capable interactions
    pub pause_spacing: f64,
    pub toast_ttl_ms: u64,
    pub request_timeout_ms: u64,
    /// Worker threads for store calls (0 = auto)
    pub workers: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let rules = ConflictRules::default();
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            webinar: "demo".to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            collision_tolerance: rules.collision_tolerance,
            pause_spacing: rules.pause_spacing,
            toast_ttl_ms: DEFAULT_TOAST_TTL_MS,
            request_timeout_ms: 10_000,
            workers: 0,
        }
    }
}

impl EditorSettings {
    /// Load from `path`; a missing file gives defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write settings: {}", path.display()))?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadApiUrl(url.to_string()));
        }
        if self.webinar.trim().is_empty() {
            return Err(ConfigError::EmptyWebinar);
        }
        if !(self.collision_tolerance >= 0.0) {
            return Err(ConfigError::NegativeTolerance("collision_tolerance", self.collision_tolerance));
        }
        if !(self.pause_spacing >= 0.0) {
            return Err(ConfigError::NegativeTolerance("pause_spacing", self.pause_spacing));
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, args: &crate::cli::Args) {
        if let Some(url) = &args.api_url {
            self.api_url = url.clone();
        }
        if let Some(webinar) = &args.webinar {
            self.webinar = webinar.clone();
        }
        if let Some(ms) = args.debounce_ms {
            self.debounce_ms = ms;
        }
        if let Some(port) = args.serve_store {
            self.api_url = format!("http://127.0.0.1:{}/api", port);
        }
    }

    pub fn rules(&self) -> ConflictRules {
        ConflictRules {
            collision_tolerance: self.collision_tolerance,
            pause_spacing: self.pause_spacing,
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            (num_cpus::get() / 2).clamp(1, 4)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cueline_test_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config.config_file("cueline.json"), PathBuf::from("/custom/cueline.json"));
    }

    #[test]
    fn test_cli_dir_wins() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir(), PathBuf::from("/from-cli"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = temp_dir("missing");
        let settings = EditorSettings::load(&dir.join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_save_load() {
        let dir = temp_dir("save");
        let path = dir.join(SETTINGS_FILE);
        let settings = EditorSettings {
            webinar: "w-77".into(),
            pause_spacing: 15.0,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(EditorSettings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = temp_dir("partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "webinar": "abc" }"#).unwrap();
        let settings = EditorSettings::load(&path).unwrap();
        assert_eq!(settings.webinar, "abc");
        assert_eq!(settings.debounce_ms, DEFAULT_DEBOUNCE_MS);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = temp_dir("invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "api_url": "ftp://nope" }"#).unwrap();
        assert!(EditorSettings::load(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);

        let s = EditorSettings {
            collision_tolerance: -1.0,
            ..Default::default()
        };
        assert_eq!(
            s.validate(),
            Err(ConfigError::NegativeTolerance("collision_tolerance", -1.0))
        );
    }

    #[test]
    fn test_cli_overrides() {
        let mut s = EditorSettings::default();
        let args = Args {
            webinar: Some("cli".into()),
            debounce_ms: Some(100),
            serve_store: Some(9999),
            ..Default::default()
        };
        s.apply_cli(&args);
        assert_eq!(s.webinar, "cli");
        assert_eq!(s.debounce_ms, 100);
        assert_eq!(s.api_url, "http://127.0.0.1:9999/api");
        assert_eq!(s.rules().pause_spacing, 10.0);
    }
}
