use std::{env, path::PathBuf};

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

/// File and environment layers of the recorder settings. Command-line flags
/// are applied afterwards by `cli::apply_overrides`.
impl Settings {
    /// Build settings from, lowest to highest priority: struct defaults, the
    /// TOML file named by `MREC_CONFIG_PATH` (or the XDG default, when it
    /// exists), then `MREC__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("MREC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the pipeline cannot run with: zero-sized chunks or
    /// queue, and empty extension, encoder program or control topic.
    pub fn validate(&self) -> Result<(), String> {
        if self.recorder.chunk_size == 0 {
            return Err("recorder.chunk_size must be >= 1".to_string());
        }
        if self.recorder.queue_capacity == 0 {
            return Err("recorder.queue_capacity must be >= 1".to_string());
        }
        if self.recorder.extension.trim_start_matches('.').trim().is_empty() {
            return Err("recorder.extension must not be empty".to_string());
        }
        if self.encoder.program.trim().is_empty() {
            return Err("encoder.program must not be empty".to_string());
        }
        if self.control.topic.trim().is_empty() {
            return Err("control.topic must not be empty".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `MREC_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MREC_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/mrec/config.toml`
/// or `~/.config/mrec/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("mrec").join("config.toml"))
}
