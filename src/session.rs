//! Session bootstrap and event loop
//!
//! A [`Session`] owns the speech engine lifecycle and drives the dialogue
//! machine with run-to-completion semantics: one event is processed to
//! completion before the next is awaited, and the only suspension point is
//! waiting for the next engine event after issuing a command.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::dialogue::{self, DialogueContext, DialogueState, MENU_TIMEOUT};
use crate::events::{EngineEvent, SessionEvent};
use crate::speech::{EngineHandle, SpeechBackend};
use crate::{Error, Result};

/// Channel capacity for injected (non-engine) events
const TRIGGER_CAPACITY: usize = 4;

/// Outcome of one wait on the session's event sources
enum LoopEvent {
    /// An event arrived
    Session(SessionEvent),
    /// The menu no-match timeout fired first
    MenuTimeout,
}

/// Handle for injecting the UI trigger event into a running session
///
/// No state currently reacts to the click; the wiring is kept so a caller
/// can hold the trigger without reaching into the session.
#[derive(Clone)]
pub struct Trigger {
    tx: mpsc::Sender<SessionEvent>,
}

impl Trigger {
    /// Send a click into the session (best-effort)
    pub async fn click(&self) {
        let _ = self.tx.send(SessionEvent::Click).await;
    }
}

/// A single spoken-dialogue session
///
/// Explicitly constructed and owned by the caller; dropping it drops the
/// engine handle and stops the engine actor.
pub struct Session {
    backend: Arc<dyn SpeechBackend>,
    state: DialogueState,
    ctx: DialogueContext,
    engine: Option<EngineHandle>,
    injected_tx: mpsc::Sender<SessionEvent>,
    injected_rx: mpsc::Receiver<SessionEvent>,
    menu_deadline: Option<Instant>,
}

impl Session {
    /// Create a session over the given speech backend
    #[must_use]
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        let (injected_tx, injected_rx) = mpsc::channel(TRIGGER_CAPACITY);
        Self {
            backend,
            state: DialogueState::Prepare,
            ctx: DialogueContext::default(),
            engine: None,
            injected_tx,
            injected_rx,
            menu_deadline: None,
        }
    }

    /// A trigger handle for this session
    #[must_use]
    pub fn trigger(&self) -> Trigger {
        Trigger {
            tx: self.injected_tx.clone(),
        }
    }

    /// The active conversational state
    #[must_use]
    pub const fn state(&self) -> DialogueState {
        self.state
    }

    /// The conversational context
    #[must_use]
    pub const fn context(&self) -> &DialogueContext {
        &self.ctx
    }

    /// Run the session until cancelled
    ///
    /// The dialogue loops through its `Prepare`/`Complete` lifecycle
    /// indefinitely; this future only resolves on an engine fault.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine actor stops unexpectedly.
    pub async fn run(&mut self) -> Result<()> {
        self.enter(DialogueState::Prepare).await?;

        loop {
            match self.next_event().await? {
                LoopEvent::MenuTimeout => {
                    self.menu_deadline = None;
                    if let Some(next) = dialogue::handle_menu_timeout(self.state) {
                        tracing::info!(state = self.state.name(), "menu listen timed out");
                        self.enter(next).await?;
                    }
                }
                LoopEvent::Session(SessionEvent::Click) => {
                    // Dead wiring: the trigger is delivered but no state
                    // defines a transition for it
                    tracing::debug!(state = self.state.name(), "trigger clicked, ignored");
                }
                LoopEvent::Session(SessionEvent::Engine(event)) => {
                    if let Some(next) = dialogue::handle_event(self.state, &mut self.ctx, &event) {
                        self.enter(next).await?;
                    } else {
                        tracing::debug!(
                            state = self.state.name(),
                            "event matched no transition, staying"
                        );
                    }
                }
            }
        }
    }

    /// Wait for the next event, racing the menu timeout when one is armed
    ///
    /// A recognition that matches no menu intent does not re-arm the
    /// timeout; the deadline keeps running from the start of the listen.
    async fn next_event(&mut self) -> Result<LoopEvent> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(Error::Session("engine not running".to_string()));
        };

        if let Some(deadline) = self.menu_deadline {
            tokio::select! {
                () = sleep_until(deadline) => Ok(LoopEvent::MenuTimeout),
                event = engine.events.recv() => Self::from_engine(event),
                event = self.injected_rx.recv() => Self::from_injection(event),
            }
        } else {
            tokio::select! {
                event = engine.events.recv() => Self::from_engine(event),
                event = self.injected_rx.recv() => Self::from_injection(event),
            }
        }
    }

    fn from_engine(event: Option<EngineEvent>) -> Result<LoopEvent> {
        event
            .map(|e| LoopEvent::Session(SessionEvent::Engine(e)))
            .ok_or_else(|| Error::Engine("engine actor stopped".to_string()))
    }

    fn from_injection(event: Option<SessionEvent>) -> Result<LoopEvent> {
        event
            .map(LoopEvent::Session)
            .ok_or_else(|| Error::Session("trigger channel closed".to_string()))
    }

    /// Enter a state: run lifecycle effects, log, issue the entry command
    async fn enter(&mut self, next: DialogueState) -> Result<()> {
        if next == DialogueState::Prepare {
            // Fresh collaborator instance; the old one is superseded rather
            // than torn down
            self.ctx.reset();
            self.engine = Some(EngineHandle::spawn(Arc::clone(&self.backend)));
        }

        self.state = next;
        self.menu_deadline = None;

        tracing::info!(
            state = next.name(),
            meeting_with = %self.ctx.meeting_with_person_name,
            "transition"
        );

        if let Some(command) = dialogue::entry_command(next, &self.ctx) {
            let Some(engine) = self.engine.as_ref() else {
                return Err(Error::Session("engine not running".to_string()));
            };
            engine.send(command).await?;
        }

        // Arm the no-match timeout once the listen command is out
        if next.has_menu_timeout() {
            self.menu_deadline = Some(Instant::now() + MENU_TIMEOUT);
        }

        Ok(())
    }
}
