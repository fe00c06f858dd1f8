// src/agent/client.rs
//
// Raw HTTP client for an OpenAI-compatible chat-completions API
// (OpenRouter). No quiz awareness; just makes API calls via reqwest.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::AgentError;
use crate::config::Config;

/// Raw HTTP client for the OpenRouter chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
            model,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(
            config.open_router_api_key.clone(),
            config.openrouter_api_base.clone(),
            config.openrouter_model.clone(),
        );
        client.max_tokens = config.openrouter_max_tokens;
        client.temperature = config.openrouter_temperature;
        client
    }

    /// Send a chat-completions request and return the assistant message.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatMessage, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(AgentError::Api {
                status,
                message: body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to parse response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| AgentError::InvalidResponse("response contained no choices".into()))
    }
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A single message in the conversation, covering the assistant's
/// tool-call turns and our tool-result turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Result of a tool invocation, addressed to the call that asked for it.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// The function half of a tool call. `arguments` is a JSON-encoded string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A tool made available to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".into(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Response body from the chat-completions endpoint.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
