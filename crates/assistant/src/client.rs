//! Chat-completions client for query interpretation and conversation.

use crate::prompts::{CHAT_PROMPT, SEARCH_PROMPT};
use crate::types::{
    CompletionRequest, CompletionResponse, ResponseFormat, SearchPlan, WireMessage,
};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use shared::config::AssistantConfig;
use shared::models::{ChatMessage, ChatRole};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Serves two purposes: turning free-text queries into catalog search
/// strings, and holding an open-ended conversation about film.
pub struct AssistantClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AssistantClient {
    /// Create a new assistant client
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!("Assistant API key cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("cinescout/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// Create a client from the configuration section
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )
    }

    /// Run one completion and return the reply text
    async fn complete(&self, messages: Vec<WireMessage>, json_reply: bool) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            response_format: json_reply.then_some(ResponseFormat {
                format: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, json_reply, "Assistant request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Assistant request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %error_text, "Assistant request failed");
            return Err(anyhow!(
                "Assistant request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let data: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse assistant response")?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| anyhow!("Assistant returned an empty response"))?;

        Ok(content)
    }

    /// Turn a free-text query into a normalized catalog search string.
    ///
    /// Fails on transport errors and on malformed or empty model replies.
    pub async fn interpret(&self, literal_query: &str) -> Result<SearchPlan> {
        let messages = vec![
            WireMessage {
                role: "system",
                content: SEARCH_PROMPT.to_string(),
            },
            WireMessage {
                role: "user",
                content: format!("User Query: \"{}\"", literal_query),
            },
        ];

        let reply = self.complete(messages, true).await?;
        let plan: SearchPlan = serde_json::from_str(strip_code_fences(&reply))
            .context("Assistant returned a malformed search plan")?;

        debug!(
            literal = literal_query,
            semantic = %plan.search_query,
            "Interpreted search query"
        );

        Ok(plan)
    }

    /// Continue the conversation with the full transcript.
    ///
    /// Error-tagged entries are dropped before sending; they exist only in
    /// the local transcript.
    pub async fn converse(&self, transcript: &[ChatMessage]) -> Result<String> {
        let mut messages = vec![WireMessage {
            role: "system",
            content: CHAT_PROMPT.to_string(),
        }];
        messages.extend(to_wire_messages(transcript));

        self.complete(messages, false).await
    }
}

/// Map the transcript to wire messages, dropping error entries
fn to_wire_messages(transcript: &[ChatMessage]) -> Vec<WireMessage> {
    transcript
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::Error => return None,
            };
            Some(WireMessage {
                role,
                content: message.content.clone(),
            })
        })
        .collect()
}

/// Strip Markdown code fences some models wrap JSON replies in
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"search_query\": \"shark robot\"}\n```"),
            "{\"search_query\": \"shark robot\"}"
        );
        assert_eq!(
            strip_code_fences("```\n{\"search_query\": \"x\"}\n```"),
            "{\"search_query\": \"x\"}"
        );
        assert_eq!(
            strip_code_fences("{\"search_query\": \"x\"}"),
            "{\"search_query\": \"x\"}"
        );
    }

    #[test]
    fn test_search_plan_parsing() {
        let plan: SearchPlan =
            serde_json::from_str(strip_code_fences("```json\n{\"search_query\": \"magia amistad\"}\n```"))
                .unwrap();
        assert_eq!(plan.search_query, "magia amistad");

        assert!(serde_json::from_str::<SearchPlan>("not json").is_err());
        assert!(serde_json::from_str::<SearchPlan>("{\"other_key\": 1}").is_err());
    }

    #[test]
    fn test_error_entries_are_dropped_from_wire_transcript() {
        let transcript = vec![
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Hi!".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "Recommend something".to_string(),
            },
            ChatMessage {
                role: ChatRole::Error,
                content: "Sorry, I ran into a problem.".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "Anything with sharks".to_string(),
            },
        ];

        let wire = to_wire_messages(&transcript);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "assistant");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[2].content, "Anything with sharks");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = AssistantClient::new(
            "https://openrouter.ai/api/v1".to_string(),
            "  ".to_string(),
            "mistralai/mistral-7b-instruct:free".to_string(),
        );
        assert!(result.is_err());
    }
}
