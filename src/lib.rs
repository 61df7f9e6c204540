//! Parley - spoken-dialogue controller for voice appointment booking
//!
//! This library provides the core functionality for the Parley controller:
//! - Dialogue state machine (appointment creation, person lookup)
//! - Grammar table for open-vocabulary slot validation
//! - Speech engine actor (TTS, STT, NLU routed to Azure Cognitive Services)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Session                          │
//! │   engine lifecycle  │  event loop  │  trigger       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Dialogue machine                       │
//! │   states  │  guards  │  grammar  │  context         │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Speech engine actor                     │
//! │   TTS  │  STT  │  NLU (intents + entities)          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dialogue;
pub mod error;
pub mod events;
pub mod session;
pub mod speech;

pub use config::Config;
pub use dialogue::{DialogueContext, DialogueState, grammar};
pub use error::{Error, Result};
pub use events::{EngineCommand, EngineEvent, Entity, Recognition, SessionEvent};
pub use session::{Session, Trigger};
pub use speech::{AzureBackend, EngineHandle, SpeechBackend};
