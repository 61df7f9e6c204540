//! Speech engine actor
//!
//! The engine is an opaque collaborator: the session sends it
//! [`EngineCommand`]s over a channel and receives discrete [`EngineEvent`]s
//! back. Speak and listen operations run as subtasks so the actor stays
//! responsive while a listen is in flight (the menu timeout path depends on
//! that).

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::events::{EngineCommand, EngineEvent, Recognition};
use crate::{Error, Result};

use super::azure::AzureSpeechClient;
use super::nlu::NluClient;

/// Channel capacity for engine commands and events
const CHANNEL_CAPACITY: usize = 8;

/// The engine's speech operations, substitutable in tests
#[async_trait]
pub trait SpeechBackend: Send + Sync + 'static {
    /// Initialize the backend (credential warm-up)
    async fn prepare(&self) -> Result<()>;

    /// Synthesize and play one utterance
    async fn speak(&self, utterance: &str) -> Result<()>;

    /// Capture and recognize one utterance, classifying intents when `nlu`
    async fn listen(&self, nlu: bool) -> Result<Recognition>;
}

/// Handle to a running speech engine actor
///
/// Dropping the handle stops the actor; a superseded engine needs no other
/// teardown.
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    /// Events emitted by the engine, in completion order
    pub events: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Spawn a fresh engine actor around the given backend
    #[must_use]
    pub fn spawn(backend: Arc<dyn SpeechBackend>) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<EngineCommand>(CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(command) = cmd_rx.recv().await {
                match command {
                    EngineCommand::Prepare => {
                        if let Err(e) = backend.prepare().await {
                            tracing::warn!(error = %e, "engine prepare failed");
                        }
                        if event_tx.send(EngineEvent::Ready).await.is_err() {
                            break;
                        }
                    }
                    EngineCommand::Speak { utterance } => {
                        let backend = Arc::clone(&backend);
                        let tx = event_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = backend.speak(&utterance).await {
                                tracing::warn!(error = %e, "speak failed");
                            }
                            let _ = tx.send(EngineEvent::SpeakComplete).await;
                        });
                    }
                    EngineCommand::Listen { nlu } => {
                        let backend = Arc::clone(&backend);
                        let tx = event_tx.clone();
                        tokio::spawn(async move {
                            let recognition = match backend.listen(nlu).await {
                                Ok(recognition) => recognition,
                                Err(e) => {
                                    tracing::warn!(error = %e, "listen failed");
                                    Recognition::empty()
                                }
                            };
                            let _ = tx.send(EngineEvent::Recognised(recognition)).await;
                        });
                    }
                }
            }
            tracing::debug!("engine actor stopped");
        });

        Self {
            commands: cmd_tx,
            events: event_rx,
        }
    }

    /// Send a command to the engine
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the actor has stopped.
    pub async fn send(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::Engine("engine actor stopped".to_string()))
    }
}

/// Azure-backed speech engine
///
/// Audio playback and capture are delegated to configured shell commands;
/// recognition and synthesis go through the Azure REST clients.
pub struct AzureBackend {
    speech: AzureSpeechClient,
    nlu: NluClient,
    locale: String,
    listen_window_ms: u64,
    player: Option<String>,
    recorder: Option<String>,
}

impl AzureBackend {
    /// Create a backend from the loaded configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            speech: AzureSpeechClient::new(config.speech.clone()),
            nlu: NluClient::new(config.nlu.clone()),
            locale: config.speech.locale.clone(),
            listen_window_ms: config.speech.no_input_timeout_ms + config.speech.complete_timeout_ms,
            player: config.audio.player.clone(),
            recorder: config.audio.recorder.clone(),
        }
    }

    /// Run the recorder command for one listen window, collecting WAV bytes
    async fn record(&self) -> Result<Vec<u8>> {
        let Some(recorder) = &self.recorder else {
            return Err(Error::Audio("no recorder command configured".to_string()));
        };

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(recorder)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Audio("recorder stdout unavailable".to_string()))?;

        let window = Duration::from_millis(self.listen_window_ms.max(1000));
        let mut audio = Vec::new();

        tokio::select! {
            result = stdout.read_to_end(&mut audio) => {
                result?;
                let _ = child.wait().await;
            }
            () = tokio::time::sleep(window) => {
                let _ = child.kill().await;
                // Drain whatever the recorder flushed before the kill
                let _ = stdout.read_to_end(&mut audio).await;
            }
        }

        tracing::debug!(audio_bytes = audio.len(), "listen window closed");
        Ok(audio)
    }

    /// Pipe synthesized audio into the player command
    async fn play(&self, audio: &[u8]) -> Result<()> {
        let Some(player) = &self.player else {
            tracing::debug!(audio_bytes = audio.len(), "no player configured, discarding audio");
            return Ok(());
        };

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(player)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Audio("player stdin unavailable".to_string()))?;
        stdin.write_all(audio).await?;
        drop(stdin);

        let status = child.wait().await?;
        if !status.success() {
            return Err(Error::Audio(format!("player exited with {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechBackend for AzureBackend {
    async fn prepare(&self) -> Result<()> {
        self.speech.warm_up().await
    }

    async fn speak(&self, utterance: &str) -> Result<()> {
        let audio = self.speech.synthesize(utterance).await?;
        self.play(&audio).await
    }

    async fn listen(&self, nlu: bool) -> Result<Recognition> {
        let audio = self.record().await?;
        if audio.is_empty() {
            return Ok(Recognition::empty());
        }

        let (utterance, confidence) = self.speech.transcribe(&audio).await?;
        if utterance.is_empty() {
            return Ok(Recognition::empty());
        }

        let (intents, entities) = if nlu {
            match self.nlu.analyze(&utterance, &self.locale).await {
                Ok(result) => result,
                Err(e) => {
                    // Degrade to an intent-less recognition; grammar-gated
                    // states can still match on the transcript
                    tracing::warn!(error = %e, "intent analysis failed");
                    (Vec::new(), Vec::new())
                }
            }
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(Recognition {
            utterance,
            confidence,
            intents,
            entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    #[async_trait]
    impl SpeechBackend for EchoBackend {
        async fn prepare(&self) -> Result<()> {
            Ok(())
        }

        async fn speak(&self, _utterance: &str) -> Result<()> {
            Ok(())
        }

        async fn listen(&self, _nlu: bool) -> Result<Recognition> {
            Ok(Recognition {
                utterance: "yes".to_string(),
                confidence: 0.9,
                intents: vec!["yes".to_string()],
                entities: Vec::new(),
            })
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SpeechBackend for FailingBackend {
        async fn prepare(&self) -> Result<()> {
            Err(Error::Engine("unreachable endpoint".to_string()))
        }

        async fn speak(&self, _utterance: &str) -> Result<()> {
            Err(Error::Tts("synthesis failed".to_string()))
        }

        async fn listen(&self, _nlu: bool) -> Result<Recognition> {
            Err(Error::Stt("capture failed".to_string()))
        }
    }

    #[tokio::test]
    async fn prepare_emits_ready() {
        let mut engine = EngineHandle::spawn(Arc::new(EchoBackend));
        engine.send(EngineCommand::Prepare).await.expect("send");
        assert_eq!(engine.events.recv().await, Some(EngineEvent::Ready));
    }

    #[tokio::test]
    async fn speak_emits_completion() {
        let mut engine = EngineHandle::spawn(Arc::new(EchoBackend));
        engine
            .send(EngineCommand::Speak {
                utterance: "hello".to_string(),
            })
            .await
            .expect("send");
        assert_eq!(engine.events.recv().await, Some(EngineEvent::SpeakComplete));
    }

    #[tokio::test]
    async fn listen_emits_recognition() {
        let mut engine = EngineHandle::spawn(Arc::new(EchoBackend));
        engine.send(EngineCommand::Listen { nlu: true }).await.expect("send");
        match engine.events.recv().await {
            Some(EngineEvent::Recognised(rec)) => {
                assert_eq!(rec.utterance, "yes");
                assert_eq!(rec.top_intent(), Some("yes"));
            }
            other => panic!("expected recognition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_events() {
        // Failures never surface to the machine as errors: a failed speak
        // still completes, a failed listen yields an empty recognition
        let mut engine = EngineHandle::spawn(Arc::new(FailingBackend));

        engine.send(EngineCommand::Prepare).await.expect("send");
        assert_eq!(engine.events.recv().await, Some(EngineEvent::Ready));

        engine
            .send(EngineCommand::Speak {
                utterance: "hello".to_string(),
            })
            .await
            .expect("send");
        assert_eq!(engine.events.recv().await, Some(EngineEvent::SpeakComplete));

        engine.send(EngineCommand::Listen { nlu: true }).await.expect("send");
        assert_eq!(
            engine.events.recv().await,
            Some(EngineEvent::Recognised(Recognition::empty()))
        );
    }
}
