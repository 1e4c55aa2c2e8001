//! Configuration model and loading for Vigil binaries.
//!
//! Configuration is optional: the locker runs with built-in defaults when no
//! file is present. Resolution order is the `VIGIL_CONFIG` environment
//! variable, then [`DEFAULT_CONFIG_PATH`], then a per-user config directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{VigilError, VigilResult};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/vigil.toml";
const CONFIG_ENV: &str = "VIGIL_CONFIG";
const USER_CONFIG_FILE: &str = "vigil.toml";
const APP_QUALIFIER: &str = "io";
const APP_ORGANIZATION: &str = "Vigil";
const APP_NAME: &str = "vigil";

/// Smallest capacity that leaves one usable slot plus the terminator reserve.
const MIN_CAPACITY: usize = 2;

/// Authentication backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthCfg {
    /// PAM service name the backend opens its context under. `su` prompts
    /// for a password for every user except root, which is exactly the
    /// policy a screen locker wants.
    pub service: String,
}

impl Default for AuthCfg {
    fn default() -> Self {
        Self {
            service: "su".to_string(),
        }
    }
}

/// Input collection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputCfg {
    /// Secure buffer capacity in bytes, terminator reserve included.
    pub capacity: usize,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Pacing applied after a denied authentication attempt.
///
/// Disabled by default: the stock behavior is an unbounded, undelayed retry
/// loop. Operators who want to blunt onlooker guessing can set a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RetryCfg {
    /// Milliseconds to wait after a denied attempt before capturing again.
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct VigilConfig {
    pub auth: AuthCfg,
    pub input: InputCfg,
    pub retry: RetryCfg,

    /// Where this configuration was loaded from, when it came from a file.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl VigilConfig {
    /// Load configuration from the first location that exists, falling back
    /// to defaults when none does.
    pub fn load_or_default() -> VigilResult<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV).map(PathBuf::from) {
            // An explicit override must exist; a typo'd path silently
            // falling back to defaults would be surprising.
            if !path.exists() {
                return Err(VigilError::InvalidConfig(format!(
                    "{CONFIG_ENV} points at {} but no file exists there",
                    path.display()
                )));
            }
            return Self::load(&path);
        }

        for candidate in default_config_candidates() {
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }

        info!("no configuration file found; using built-in defaults");
        Ok(Self::default())
    }

    /// Parse the TOML file at `path`.
    pub fn load(path: &Path) -> VigilResult<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|err| VigilError::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.path = Some(path.to_path_buf());
        config.validate()?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> VigilResult<()> {
        if self.auth.service.trim().is_empty() {
            return Err(VigilError::InvalidConfig(
                "auth.service must not be empty".into(),
            ));
        }
        if self.input.capacity < MIN_CAPACITY {
            return Err(VigilError::InvalidConfig(format!(
                "input.capacity must be at least {MIN_CAPACITY} (got {})",
                self.input.capacity
            )));
        }
        Ok(())
    }
}

fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    match ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME) {
        Some(dirs) => candidates.push(dirs.config_dir().join(USER_CONFIG_FILE)),
        None => warn!("unable to determine a user configuration directory"),
    }
    candidates
}
