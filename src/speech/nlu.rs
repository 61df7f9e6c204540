//! Azure CLU intent/entity analysis client

use serde::{Deserialize, Serialize};

use crate::config::NluConfig;
use crate::events::Entity;
use crate::{Error, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    analysis_input: AnalysisInput<'a>,
    parameters: AnalyzeParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisInput<'a> {
    conversation_item: ConversationItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationItem<'a> {
    id: &'static str,
    participant_id: &'static str,
    text: &'a str,
    language: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeParameters<'a> {
    project_name: &'a str,
    deployment_name: &'a str,
    string_index_type: &'static str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    result: AnalyzeResult,
}

#[derive(Deserialize)]
struct AnalyzeResult {
    prediction: Prediction,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(default)]
    intents: Vec<PredictedIntent>,
    #[serde(default)]
    entities: Vec<PredictedEntity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictedIntent {
    category: String,
    confidence_score: f32,
}

#[derive(Deserialize)]
struct PredictedEntity {
    category: String,
    text: String,
}

/// Client for the CLU conversation analysis endpoint
///
/// Classifies an utterance against the configured pre-trained project
/// (intents `create a meeting`, `know who`, `yes`, `no`).
pub struct NluClient {
    client: reqwest::Client,
    config: NluConfig,
}

impl NluClient {
    /// Create a new NLU client
    #[must_use]
    pub fn new(config: NluConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Analyze one utterance, returning ranked intent labels and entities
    ///
    /// Intents are ordered most confident first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Nlu`] if the analysis request fails.
    pub async fn analyze(
        &self,
        utterance: &str,
        language: &str,
    ) -> Result<(Vec<String>, Vec<Entity>)> {
        tracing::debug!(utterance = %utterance, "starting intent analysis");

        let request = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: "1",
                    participant_id: "user",
                    text: utterance,
                    language,
                },
            },
            parameters: AnalyzeParameters {
                project_name: &self.config.project,
                deployment_name: &self.config.deployment,
                string_index_type: "TextElement_V8",
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "NLU request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "NLU API error");
            return Err(Error::Nlu(format!("NLU API error {status}: {body}")));
        }

        let result: AnalyzeResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse NLU response");
            e
        })?;

        let mut intents = result.result.prediction.intents;
        intents.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
        let labels: Vec<String> = intents.into_iter().map(|i| i.category).collect();

        let entities: Vec<Entity> = result
            .result
            .prediction
            .entities
            .into_iter()
            .map(|e| Entity {
                category: e.category,
                text: e.text,
            })
            .collect();

        tracing::info!(top_intent = ?labels.first(), entities = entities.len(), "analysis complete");
        Ok((labels, entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_parses_and_ranks_by_confidence() {
        let json = r#"{
            "result": {
                "prediction": {
                    "topIntent": "create a meeting",
                    "intents": [
                        { "category": "know who", "confidenceScore": 0.12 },
                        { "category": "create a meeting", "confidenceScore": 0.85 }
                    ],
                    "entities": [
                        { "category": "Person", "text": "vlad" }
                    ]
                }
            }
        }"#;
        let parsed: AnalyzeResponse = serde_json::from_str(json).expect("must parse");

        let mut intents = parsed.result.prediction.intents;
        intents.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
        assert_eq!(intents[0].category, "create a meeting");
        assert_eq!(parsed.result.prediction.entities[0].text, "vlad");
    }

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let request = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: "1",
                    participant_id: "user",
                    text: "create a meeting",
                    language: "en-US",
                },
            },
            parameters: AnalyzeParameters {
                project_name: "Appointment",
                deployment_name: "Appointment",
                string_index_type: "TextElement_V8",
            },
        };

        let json = serde_json::to_value(&request).expect("must serialize");
        assert_eq!(json["kind"], "Conversation");
        assert_eq!(json["analysisInput"]["conversationItem"]["text"], "create a meeting");
        assert_eq!(json["parameters"]["projectName"], "Appointment");
        assert_eq!(json["parameters"]["deploymentName"], "Appointment");
    }
}
