//! Typed commands and events exchanged with the speech engine
//!
//! Every payload field is a required, concretely-typed value. Missing
//! collaborator data degrades to an empty [`Recognition`] rather than an
//! optional field that callers have to chase.

/// Command sent to the speech engine actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Initialize the engine (token warm-up); answered by [`EngineEvent::Ready`]
    Prepare,
    /// Synthesize and play an utterance; answered by [`EngineEvent::SpeakComplete`]
    Speak {
        /// Text to speak
        utterance: String,
    },
    /// Listen for one utterance; answered by [`EngineEvent::Recognised`]
    Listen {
        /// Run intent/entity classification on the transcript
        nlu: bool,
    },
}

/// Event emitted by the speech engine actor
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Engine is initialized and ready for commands
    Ready,
    /// The previous `Speak` finished playing
    SpeakComplete,
    /// The previous `Listen` produced a recognition result
    Recognised(Recognition),
}

/// A recognition result from one listen cycle
///
/// Consumed once by the transition that it triggers, never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recognition {
    /// Recognized utterance text (may be empty if nothing was heard)
    pub utterance: String,
    /// Transcription confidence in `[0, 1]`
    pub confidence: f32,
    /// Ranked intent labels, most confident first (empty without NLU)
    pub intents: Vec<String>,
    /// Extracted entities (empty without NLU)
    pub entities: Vec<Entity>,
}

impl Recognition {
    /// An empty result, used when the engine heard nothing usable
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The top-ranked classified intent, if any
    #[must_use]
    pub fn top_intent(&self) -> Option<&str> {
        self.intents.first().map(String::as_str)
    }
}

/// An entity extracted by the NLU service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Entity category (e.g. `"Person"`, `"Day"`)
    pub category: String,
    /// Surface text of the entity
    pub text: String,
}

/// Event fed into the session loop
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Event from the speech engine
    Engine(EngineEvent),
    /// UI trigger activation (no state currently reacts to it)
    Click,
}
