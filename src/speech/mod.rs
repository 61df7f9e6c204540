//! Speech engine module
//!
//! The engine actor plus the Azure REST clients it delegates to.
//! The dialogue core only ever sees the actor's command/event channels.

mod azure;
mod engine;
mod nlu;

pub use azure::AzureSpeechClient;
pub use engine::{AzureBackend, EngineHandle, SpeechBackend};
pub use nlu::NluClient;
