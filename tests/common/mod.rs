//! Shared test fixtures for the integration tests

use std::collections::VecDeque;
use std::future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley::{Recognition, Result, SpeechBackend};

/// Build a recognition result with ranked intents
pub fn recognition(utterance: &str, confidence: f32, intents: &[&str]) -> Recognition {
    Recognition {
        utterance: utterance.to_string(),
        confidence,
        intents: intents.iter().map(ToString::to_string).collect(),
        entities: Vec::new(),
    }
}

/// Speech backend that replays scripted recognitions and records prompts
///
/// Each `listen` pops the next scripted result; once the script is exhausted
/// the listen never resolves, which is how a silent user looks to the engine.
pub struct ScriptedBackend {
    spoken: Arc<Mutex<Vec<String>>>,
    listens: Mutex<VecDeque<Recognition>>,
}

impl ScriptedBackend {
    /// Create a backend with the given listen script, plus a handle to the
    /// record of spoken prompts
    pub fn new(listens: Vec<Recognition>) -> (Arc<Self>, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let backend = Arc::new(Self {
            spoken: Arc::clone(&spoken),
            listens: Mutex::new(listens.into()),
        });
        (backend, spoken)
    }
}

#[async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    async fn speak(&self, utterance: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance.to_string());
        Ok(())
    }

    async fn listen(&self, _nlu: bool) -> Result<Recognition> {
        let next = self.listens.lock().unwrap().pop_front();
        match next {
            Some(rec) => Ok(rec),
            None => future::pending().await,
        }
    }
}
