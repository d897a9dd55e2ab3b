use crate::runner::python::{DEFAULT_PACKAGE, DEFAULT_PYTHON};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the installed Kilosort repository
pub const KILOSORT_REPOSITORY_ENV: &str = "kilosort_repository";
/// Environment variable overriding the rc file location
pub const RC_ENV: &str = "KSTRIGGER_RC";

/// Installation settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Interpreter used to launch pipeline modules
    pub python: PathBuf,
    /// Python package holding the module scripts
    pub modules_package: String,
    /// Base Kilosort checkout; the versioned sibling is derived from it
    pub kilosort_repository: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            python: PathBuf::from(DEFAULT_PYTHON),
            modules_package: DEFAULT_PACKAGE.to_string(),
            kilosort_repository: None,
        }
    }
}

impl Settings {
    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(RC_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kstrigger")
            .join("rc")
    }

    /// Load settings from the rc file (if present) and the environment
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
            Self::parse(&content, config_path.parent().unwrap_or(Path::new(".")))
        } else {
            Self::default()
        };

        if let Ok(repo) = std::env::var(KILOSORT_REPOSITORY_ENV) {
            if !repo.trim().is_empty() {
                settings.kilosort_repository = Some(PathBuf::from(repo));
            }
        }

        Ok(settings)
    }

    /// Parse `key=value` lines; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Self {
        let mut settings = Self::default();
        let resolve = |value: &str| {
            let path = PathBuf::from(value);
            if path.is_relative() && value.contains(std::path::MAIN_SEPARATOR) {
                base_dir.join(path)
            } else {
                path
            }
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line: {}", line);
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "python" => settings.python = resolve(value),
                "modules.package" => settings.modules_package = value.to_string(),
                "kilosort.repository" => settings.kilosort_repository = Some(resolve(value)),
                other => log::warn!("Unknown config key: {}", other),
            }
        }

        settings
    }
}
