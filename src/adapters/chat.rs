//! Chat-completions oracle.
//!
//! Posts the document to an OpenAI-compatible `/chat/completions` endpoint
//! with a strict JSON-schema response format and parses the first choice's
//! message content as a [`SimilarityAnalysis`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{OracleError, SimilarityOracle};
use crate::config::OracleSettings;
use crate::domain::SimilarityAnalysis;

const SYSTEM_PROMPT: &str = "You are an academic integrity expert. Analyze the following text \
for semantic similarity and plagiarism. Provide a detailed report in JSON format.";

/// HTTP oracle backed by a chat-completions API
pub struct ChatCompletionsOracle {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl ChatCompletionsOracle {
    /// Create an oracle for an endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved configuration
    pub fn from_settings(settings: &OracleSettings) -> Result<Self, OracleError> {
        let api_key = settings.api_key.clone().ok_or(OracleError::MissingApiKey)?;
        Ok(Self::new(&settings.endpoint, &settings.model, api_key))
    }

    fn request_body(&self, text: &str) -> Value {
        let prompt = format!(
            "Analyze the following academic text for semantic similarity and plagiarism.\n\
             Identify specific segments that might be problematic and explain why. \
             Quote each segment verbatim from the text.\n\
             Identify academic papers, articles, or online sources the content resembles, \
             with their formal title and a direct URL where possible.\n\
             Text: {}",
            text
        );

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "similarity_analysis",
                    "strict": true,
                    "schema": analysis_schema()
                }
            }
        })
    }
}

/// JSON schema the oracle must answer with
fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "score": { "type": "number", "description": "Overall similarity percentage 0-100" },
            "summary": { "type": "string", "description": "Executive summary of the analysis" },
            "references": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["title", "url"],
                    "additionalProperties": false
                }
            },
            "segments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "text": { "type": "string" },
                        "similarity": { "type": "number", "description": "Similarity weight 0-1" },
                        "source": { "type": "string" },
                        "explanation": { "type": "string" }
                    },
                    "required": ["text", "similarity", "source", "explanation"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["score", "summary", "segments", "references"],
        "additionalProperties": false
    })
}

/// Extract the analysis from a raw chat-completions response body
fn parse_response(body: &str) -> Result<SimilarityAnalysis, OracleError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(OracleError::EmptyResponse)?;

    let analysis: SimilarityAnalysis = serde_json::from_str(&content)?;
    Ok(analysis.normalized())
}

#[async_trait]
impl SimilarityOracle for ChatCompletionsOracle {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn analyze(&self, text: &str) -> Result<SimilarityAnalysis, OracleError> {
        debug!(endpoint = %self.endpoint, model = %self.model, chars = text.chars().count(), "Calling similarity oracle");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        parse_response(&body)
    }
}
