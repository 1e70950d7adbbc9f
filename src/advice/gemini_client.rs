use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::fault::AdviceFault;
use super::framing::system_instruction;
use super::{AdviceService, Turn};
use crate::chat::conversation_state::Role;
use crate::config::Config;

/// Keys shorter than this are treated as placeholders.
const MIN_KEY_LEN: usize = 10;
const TEMPERATURE: f32 = 0.15;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSource {
    uri: Option<String>,
}

impl GenerateContentResponse {
    /// Reply text plus a citation line when the answer was grounded in a web source.
    fn into_reply(self) -> Result<String, AdviceFault> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(AdviceFault::EmptyReply);
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AdviceFault::EmptyReply);
        }

        let source = candidate.grounding_metadata.and_then(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .find_map(|chunk| {
                    chunk
                        .web
                        .and_then(|web| web.uri)
                        .filter(|uri| !uri.is_empty())
                })
        });

        Ok(match source {
            Some(uri) => format!("{text}\n\n[Verified Market Intelligence Source: {uri}]"),
            None => text,
        })
    }
}

/// Calls the model's `generateContent` endpoint directly.
pub struct GeminiAdviceClient {
    api_key: Option<String>,
    endpoint: String,
    system_instruction: String,
    client: reqwest::Client,
}

impl GeminiAdviceClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.gemini_base_url.as_str().trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint,
            system_instruction: system_instruction(&config.contact_email),
            client,
        })
    }

    fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| *key != "undefined" && key.len() >= MIN_KEY_LEN)
    }

    fn build_request(&self, query: &str, history: &[Turn]) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: Some("user"),
            parts: vec![Part {
                text: query.to_string(),
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: self.system_instruction.clone(),
                }],
            },
            tools: vec![Tool {
                google_search: serde_json::json!({}),
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[async_trait]
impl AdviceService for GeminiAdviceClient {
    async fn get_advice(&self, query: &str, history: &[Turn]) -> Result<String, AdviceFault> {
        let Some(api_key) = self.credential() else {
            warn!("Advice credential is missing in the current environment");
            return Err(AdviceFault::ConfigMissing);
        };

        let request_body = self.build_request(query, history);
        debug!(
            "Sending request to advice service: {}",
            serde_json::to_string_pretty(&request_body).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Advice request failed to send: {}", e);
                AdviceFault::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Advice request failed with status {}: {}", status, error_text);
            return Err(AdviceFault::from_status(status.as_u16(), &error_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!("Advice response could not be decoded: {}", e);
            AdviceFault::Transport(e.to_string())
        })?;

        let reply = parsed.into_reply();
        if reply.is_err() {
            info!("Advice service returned no usable text");
        }
        reply
    }
}
