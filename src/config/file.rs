//! TOML configuration file loading
//!
//! Supports `~/.config/parley/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ParleyConfigFile {
    /// Speech synthesis/transcription configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Intent classification (NLU) configuration
    #[serde(default)]
    pub nlu: NluFileConfig,

    /// Audio shell-out configuration
    #[serde(default)]
    pub audio: AudioFileConfig,
}

/// Speech service configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Azure region (e.g. "northeurope")
    pub region: Option<String>,

    /// Azure speech resource key
    pub key: Option<String>,

    /// Default TTS voice (e.g. "en-US-DavisNeural")
    pub voice: Option<String>,

    /// Recognition locale (e.g. "en-US")
    pub locale: Option<String>,

    /// ASR no-input timeout in milliseconds
    pub no_input_timeout_ms: Option<u64>,

    /// ASR complete timeout in milliseconds
    pub complete_timeout_ms: Option<u64>,
}

/// NLU service configuration
#[derive(Debug, Default, Deserialize)]
pub struct NluFileConfig {
    /// Conversation analysis endpoint URL
    pub endpoint: Option<String>,

    /// Language resource key
    pub key: Option<String>,

    /// CLU project name
    pub project: Option<String>,

    /// CLU deployment name
    pub deployment: Option<String>,
}

/// Audio shell-out configuration
#[derive(Debug, Default, Deserialize)]
pub struct AudioFileConfig {
    /// Player command for synthesized audio (reads MP3 from stdin)
    pub player: Option<String>,

    /// Recorder command producing WAV on stdout
    pub recorder: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
#[must_use]
pub fn load_config_file() -> ParleyConfigFile {
    let Some(path) = config_file_path() else {
        return ParleyConfigFile::default();
    };

    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ParleyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/parley/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("parley").join("config.toml"))
}
