//! Configuration management for the Parley controller
//!
//! Layered resolution: built-in defaults, then the optional TOML file
//! overlay, then environment variables. All speech/NLU settings are opaque
//! pass-through configuration for the engine; the core machine never
//! interprets them.

pub mod file;

use crate::{Error, Result};

/// Default Azure region
const DEFAULT_REGION: &str = "northeurope";

/// Default TTS voice
const DEFAULT_VOICE: &str = "en-US-DavisNeural";

/// Default recognition locale
const DEFAULT_LOCALE: &str = "en-US";

/// Default ASR no-input timeout in milliseconds
const DEFAULT_NO_INPUT_TIMEOUT_MS: u64 = 5000;

/// Parley controller configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Speech synthesis/transcription settings
    pub speech: SpeechConfig,

    /// Intent classification settings
    pub nlu: NluConfig,

    /// Audio shell-out settings
    pub audio: AudioConfig,
}

/// Speech service settings (Azure Cognitive Services)
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Azure region for the speech resource
    pub region: String,

    /// Azure speech resource key
    pub key: String,

    /// Default TTS voice identifier
    pub voice: String,

    /// Recognition locale
    pub locale: String,

    /// ASR no-input timeout in milliseconds (bounds one listen window)
    pub no_input_timeout_ms: u64,

    /// ASR complete timeout in milliseconds (0 = return on first result)
    pub complete_timeout_ms: u64,
}

/// NLU service settings (Azure CLU)
#[derive(Debug, Clone)]
pub struct NluConfig {
    /// Conversation analysis endpoint URL
    pub endpoint: String,

    /// Language resource key
    pub key: String,

    /// CLU project identifying the pre-trained intent model
    pub project: String,

    /// CLU deployment name
    pub deployment: String,
}

/// Audio shell-out settings
///
/// Audio hardware is outside the core: playback and capture are delegated to
/// external commands, the way a headless install would wire them up.
#[derive(Debug, Clone, Default)]
pub struct AudioConfig {
    /// Player command for synthesized audio (reads MP3 from stdin,
    /// e.g. `mpg123 -q -`); synthesized audio is discarded when unset
    pub player: Option<String>,

    /// Recorder command producing mono 16 kHz WAV on stdout
    /// (e.g. `arecord -q -f S16_LE -r 16000 -c 1 -t wav`)
    pub recorder: Option<String>,
}

impl Config {
    /// Load configuration from the TOML file overlay and environment
    ///
    /// Environment variables take precedence over the file:
    /// `PARLEY_SPEECH_REGION`, `PARLEY_SPEECH_KEY`, `PARLEY_TTS_VOICE`,
    /// `PARLEY_LOCALE`, `PARLEY_NLU_ENDPOINT`, `PARLEY_NLU_KEY`,
    /// `PARLEY_NLU_PROJECT`, `PARLEY_NLU_DEPLOYMENT`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required credential is missing.
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();

        let speech = SpeechConfig {
            region: env_or("PARLEY_SPEECH_REGION", file.speech.region, DEFAULT_REGION),
            key: env_or("PARLEY_SPEECH_KEY", file.speech.key, ""),
            voice: env_or("PARLEY_TTS_VOICE", file.speech.voice, DEFAULT_VOICE),
            locale: env_or("PARLEY_LOCALE", file.speech.locale, DEFAULT_LOCALE),
            no_input_timeout_ms: file
                .speech
                .no_input_timeout_ms
                .unwrap_or(DEFAULT_NO_INPUT_TIMEOUT_MS),
            complete_timeout_ms: file.speech.complete_timeout_ms.unwrap_or(0),
        };

        let nlu = NluConfig {
            endpoint: env_or("PARLEY_NLU_ENDPOINT", file.nlu.endpoint, ""),
            key: env_or("PARLEY_NLU_KEY", file.nlu.key, ""),
            project: env_or("PARLEY_NLU_PROJECT", file.nlu.project, "Appointment"),
            deployment: env_or("PARLEY_NLU_DEPLOYMENT", file.nlu.deployment, "Appointment"),
        };

        let audio = AudioConfig {
            player: std::env::var("PARLEY_AUDIO_PLAYER").ok().or(file.audio.player),
            recorder: std::env::var("PARLEY_AUDIO_RECORDER")
                .ok()
                .or(file.audio.recorder),
        };

        let config = Self { speech, nlu, audio };
        config.validate()?;
        Ok(config)
    }

    /// Validate that required credentials are present
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the missing setting.
    pub fn validate(&self) -> Result<()> {
        if self.speech.key.is_empty() {
            return Err(Error::Config(
                "speech key required (PARLEY_SPEECH_KEY or [speech].key)".to_string(),
            ));
        }
        if self.nlu.endpoint.is_empty() {
            return Err(Error::Config(
                "NLU endpoint required (PARLEY_NLU_ENDPOINT or [nlu].endpoint)".to_string(),
            ));
        }
        if self.nlu.key.is_empty() {
            return Err(Error::Config(
                "NLU key required (PARLEY_NLU_KEY or [nlu].key)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve a setting: environment variable, then file value, then default
fn env_or(var: &str, file_value: Option<String>, default: &str) -> String {
    std::env::var(var)
        .ok()
        .or(file_value)
        .unwrap_or_else(|| default.to_string())
}
