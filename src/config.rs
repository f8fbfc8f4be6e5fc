//! Driver runtime configuration (TOML)
//!
//! ```toml
//! fps = 30.0
//! profile = "/path/to/profile.json"   # optional, builtin G67 otherwise
//!
//! [policy]
//! kind = "round-robin"                 # or "full", "dirty"
//! chunks_per_tick = 1
//! ```

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::profile::DeviceProfile;
use crate::scheduler::UpdatePolicy;

/// Accepted host tick rates
pub const FPS_RANGE: RangeInclusive<f32> = 0.1..=1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Chunk scheduling policy
    pub policy: UpdatePolicy,
    /// Host tick rate for the CLI render loop
    pub fps: f32,
    /// JSON device profile; builtin G67 when absent
    pub profile: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            policy: UpdatePolicy::default(),
            fps: 30.0,
            profile: None,
        }
    }
}

impl DriverConfig {
    /// Parse from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from an explicit path, or the default path if it exists.
    ///
    /// A missing default file means defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !explicit && !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        if !FPS_RANGE.contains(&self.fps) {
            return Err(ConfigError::InvalidConfig(format!(
                "fps must be within {}..={}, got {}",
                FPS_RANGE.start(),
                FPS_RANGE.end(),
                self.fps
            )));
        }
        Ok(())
    }

    /// Resolve the device profile this config points at
    pub fn device_profile(&self) -> Result<DeviceProfile, ConfigError> {
        match &self.profile {
            Some(path) => DeviceProfile::load(path),
            None => Ok(DeviceProfile::g67()),
        }
    }
}

/// `$XDG_CONFIG_HOME/g67_driver/config.toml`, falling back to `~/.config`
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn config_dir() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("g67_driver")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/g67_driver")
    } else {
        PathBuf::from("/tmp/g67_driver")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::from_toml("").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.policy, UpdatePolicy::RoundRobin { chunks_per_tick: 1 });
        assert!(config.profile.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = DriverConfig::from_toml(
            r#"
            fps = 60.0
            profile = "/etc/g67.json"

            [policy]
            kind = "round-robin"
            chunks_per_tick = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.fps, 60.0);
        assert_eq!(config.profile, Some(PathBuf::from("/etc/g67.json")));
        assert_eq!(config.policy, UpdatePolicy::RoundRobin { chunks_per_tick: 2 });
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_values() {
        let config = DriverConfig::from_toml("fps = 0.0").unwrap();
        assert!(config.validate().is_err());

        let config =
            DriverConfig::from_toml("[policy]\nkind = \"round-robin\"\nchunks_per_tick = 0\n").unwrap();
        assert!(config.validate().is_err());

        assert!(DriverConfig::from_toml("[policy]\nkind = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_fps_bounds() {
        for fps in [1e-40, 0.05, 1000.5, f32::INFINITY, f32::NAN, -30.0] {
            let config = DriverConfig {
                fps,
                ..DriverConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidConfig(_))),
                "fps {fps} accepted"
            );
        }
        for fps in [0.1, 1.0, 30.0, 1000.0] {
            let config = DriverConfig {
                fps,
                ..DriverConfig::default()
            };
            config.validate().unwrap();
            // The CLI loop derives its frame period from this
            let _ = std::time::Duration::from_secs_f32(1.0 / config.fps);
        }
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = DriverConfig::load(Some(Path::new("/nonexistent/g67/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_builtin_profile_when_unset() {
        let profile = DriverConfig::default().device_profile().unwrap();
        assert_eq!(profile.pid, 0x8043);
    }
}
