//! Azure Cognitive Services speech clients (token, TTS, STT)

use tokio::sync::RwLock;

use crate::config::SpeechConfig;
use crate::{Error, Result};

/// TTS output format requested from the synthesis endpoint
const TTS_OUTPUT_FORMAT: &str = "audio-16khz-32kbitrate-mono-mp3";

/// Response from the detailed-format transcription endpoint
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    #[serde(rename = "RecognitionStatus")]
    recognition_status: String,
    #[serde(rename = "DisplayText", default)]
    display_text: String,
    #[serde(rename = "NBest", default)]
    n_best: Vec<TranscriptionAlternative>,
}

#[derive(serde::Deserialize)]
struct TranscriptionAlternative {
    #[serde(rename = "Confidence", default)]
    confidence: f32,
    #[serde(rename = "Display", default)]
    display: String,
}

/// Client for Azure speech synthesis and transcription
///
/// Caches the short-lived bearer token; a rejected request invalidates the
/// cache so the next call re-authenticates.
pub struct AzureSpeechClient {
    client: reqwest::Client,
    config: SpeechConfig,
    token: RwLock<Option<String>>,
}

impl AzureSpeechClient {
    /// Create a new speech client
    #[must_use]
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            token: RwLock::new(None),
        }
    }

    /// Fetch and cache a bearer token
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if token issuance fails.
    pub async fn warm_up(&self) -> Result<()> {
        self.cached_token().await?;
        Ok(())
    }

    /// Retrieve the cached token, authenticating if the cache is empty
    async fn cached_token(&self) -> Result<String> {
        // Fast path: read-lock
        {
            let r = self.token.read().await;
            if let Some(t) = r.as_ref() {
                return Ok(t.clone());
            }
        }
        // Slow path: acquire write-lock and authenticate
        let mut w = self.token.write().await;
        // Re-check after acquiring write lock (another task may have authenticated)
        if let Some(t) = w.as_ref() {
            return Ok(t.clone());
        }
        let t = self.issue_token().await?;
        *w = Some(t.clone());
        Ok(t)
    }

    /// Invalidate the cached token so the next request re-authenticates
    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    /// Issue a bearer token from the STS endpoint
    async fn issue_token(&self) -> Result<String> {
        let url = format!(
            "https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken",
            self.config.region
        );

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .header("Content-Length", "0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "token issuance failed");
            return Err(Error::Engine(format!("token issuance failed: {status}")));
        }

        Ok(response.text().await?)
    }

    /// Synthesize an utterance to MP3 audio bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tts`] if synthesis fails.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(chars = text.len(), "starting synthesis");

        let url = format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.config.region
        );
        let ssml = format!(
            "<speak version='1.0' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
            self.config.locale,
            self.config.voice,
            escape_xml(text)
        );

        let token = self.cached_token().await?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", TTS_OUTPUT_FORMAT)
            .header("User-Agent", "parley")
            .body(ssml)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "synthesis request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.invalidate_token().await;
            }
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Tts(format!("TTS API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }

    /// Transcribe WAV audio to text with a confidence score
    ///
    /// Returns the best alternative's display text and confidence, or an
    /// empty transcript with zero confidence when nothing was recognized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stt`] if transcription fails.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<(String, f32)> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let url = format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={}&format=detailed",
            self.config.region, self.config.locale
        );

        let token = self.cached_token().await?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "audio/wav; codecs=audio/pcm; samplerate=16000")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.invalidate_token().await;
            }
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT API error");
            return Err(Error::Stt(format!("STT API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription response");
            e
        })?;

        if result.recognition_status != "Success" {
            tracing::debug!(status = %result.recognition_status, "nothing recognized");
            return Ok((String::new(), 0.0));
        }

        let (transcript, confidence) = result
            .n_best
            .first()
            .map_or((result.display_text.clone(), 0.0), |best| {
                (best.display.clone(), best.confidence)
            });

        tracing::info!(transcript = %transcript, confidence, "transcription complete");
        Ok((transcript, confidence))
    }
}

/// Escape text for embedding in an SSML document
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
