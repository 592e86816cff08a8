use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level recorder settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/mrec/config.toml` or `~/.config/mrec/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `MREC__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub recorder: RecorderSettings,
    pub encoder: EncoderSettings,
    pub player: PlayerSettings,
    pub control: ControlSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Root of the music library recordings are written into.
    pub music_root: PathBuf,
    /// Optional second root that receives a copy of every recording.
    pub backup_root: Option<PathBuf>,
    /// Extension of encoded files, without the dot.
    pub extension: String,
    /// Bytes read from the raw audio stream per iteration.
    pub chunk_size: usize,
    /// Finished tracks allowed to wait for the encoder before the
    /// segmenter blocks.
    pub queue_capacity: usize,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            music_root: default_music_root(),
            backup_root: None,
            extension: "ogg".to_string(),
            chunk_size: 4000,
            queue_capacity: 5,
        }
    }
}

fn default_music_root() -> PathBuf {
    env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Music"))
        .unwrap_or_else(|| PathBuf::from("Music"))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Encoder executable, invoked with oggenc-compatible arguments.
    pub program: String,
    /// Quality passed as `-q`.
    pub quality: u8,
    /// Format of the raw PCM on stdin.
    pub raw_rate: u32,
    pub raw_channels: u16,
    pub raw_bits: u16,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            program: "oggenc".to_string(),
            quality: 6,
            raw_rate: 44_100,
            raw_channels: 2,
            raw_bits: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Preferred player, matched against the part of the bus name after
    /// `org.mpris.MediaPlayer2.` (e.g. "spotify"). Any player is used when unset.
    pub name: Option<String>,
    /// Seconds between discovery attempts.
    pub retry_secs: u64,
    /// Give up after this many attempts. Retries forever when unset.
    pub max_attempts: Option<u32>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            name: None,
            retry_secs: 5,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlSettings {
    /// MQTT broker host. Remote control is disabled when unset.
    pub broker: Option<String>,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    /// Whether recording is enabled before any command arrives.
    pub start_recording: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            broker: None,
            port: 1883,
            topic: "mrec".to_string(),
            client_id: "mrec".to_string(),
            start_recording: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "mrec=info".to_string(),
        }
    }
}
