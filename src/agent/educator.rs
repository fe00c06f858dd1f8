// src/agent/educator.rs
//
// Production implementation of the quiz-generation agent: drives the
// model through its tool calls and recovers the session id it recorded.

use sqlx::SqlitePool;

use super::client::{ChatMessage, ChatRequest, OpenRouterClient, ToolCall};
use super::prompts::SYSTEM_INSTRUCTION;
use super::tools::{self, ContextArgs, InitializeQuizArgs, RECORDING_FAILED};
use super::{AgentError, GeneratedQuiz, QuizAgent};

/// Every quiz carries this many questions.
const TOTAL_QUESTIONS: i64 = 5;

/// Upper bound on request/tool-execution rounds per generation.
const MAX_TOOL_ROUNDS: usize = 8;

/// One executed tool call, kept so the run's outcome can be read back
/// out of the transcript afterwards.
#[derive(Debug, Clone)]
pub struct ToolEvent {
    pub name: String,
    pub output: String,
}

/// LLM-backed quiz generator. The model only ever touches storage through
/// the capabilities in `tools`.
pub struct EducatorAgent {
    client: OpenRouterClient,
    pool: SqlitePool,
}

impl EducatorAgent {
    pub fn new(client: OpenRouterClient, pool: SqlitePool) -> Self {
        Self { client, pool }
    }

    /// Executes a single tool call and returns its JSON-encoded output.
    async fn dispatch(&self, call: &ToolCall) -> String {
        match call.function.name.as_str() {
            "initialize_quiz_session" => {
                let result = match serde_json::from_str::<InitializeQuizArgs>(
                    &call.function.arguments,
                ) {
                    Ok(args) => {
                        match tools::initialize_quiz_session(
                            &self.pool,
                            &args.topic,
                            &args.questions_data,
                        )
                        .await
                        {
                            Ok(session_id) => session_id,
                            Err(err) => {
                                tracing::error!("Error in initialize_quiz_session: {}", err);
                                RECORDING_FAILED
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("Malformed initialize_quiz_session arguments: {}", err);
                        RECORDING_FAILED
                    }
                };
                serde_json::json!({ "result": result }).to_string()
            }
            "get_educational_context" => {
                match serde_json::from_str::<ContextArgs>(&call.function.arguments) {
                    Ok(args) => serde_json::json!({
                        "result": tools::get_educational_context(&args.topic)
                    })
                    .to_string(),
                    Err(err) => {
                        tracing::error!("Malformed get_educational_context arguments: {}", err);
                        serde_json::json!({ "error": "invalid arguments" }).to_string()
                    }
                }
            }
            other => {
                tracing::warn!("Agent requested unknown tool: {}", other);
                serde_json::json!({ "error": format!("unknown tool: {other}") }).to_string()
            }
        }
    }
}

#[async_trait::async_trait]
impl QuizAgent for EducatorAgent {
    async fn generate_quiz(&self, topic: &str) -> Result<GeneratedQuiz, AgentError> {
        tracing::info!("Starting quiz generation for topic: {}", topic);

        let mut messages = vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(format!(
                "Please generate a professional quiz about {topic}."
            )),
        ];
        let mut events: Vec<ToolEvent> = Vec::new();

        for _ in 0..MAX_TOOL_ROUNDS {
            let request = ChatRequest {
                model: self.client.model.clone(),
                messages: messages.clone(),
                tools: tools::tool_definitions(),
                max_tokens: self.client.max_tokens,
                temperature: self.client.temperature,
            };

            let reply = self.client.chat(&request).await?;
            let tool_calls = reply.tool_calls.clone();
            messages.push(reply);

            if tool_calls.is_empty() {
                break;
            }

            for call in &tool_calls {
                let output = self.dispatch(call).await;
                tracing::debug!(tool = %call.function.name, %output, "tool call executed");
                events.push(ToolEvent {
                    name: call.function.name.clone(),
                    output: output.clone(),
                });
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }

        let session_id = session_id_from_events(&events).ok_or(AgentError::NoSession)?;

        Ok(GeneratedQuiz {
            session_id,
            total_questions: TOTAL_QUESTIONS,
        })
    }
}

/// Scans the run's tool events for the result of `initialize_quiz_session`.
/// The failure sentinel counts as no session.
fn session_id_from_events(events: &[ToolEvent]) -> Option<i64> {
    events
        .iter()
        .filter(|event| event.name == "initialize_quiz_session")
        .find_map(|event| {
            let value: serde_json::Value = serde_json::from_str(&event.output).ok()?;
            value.get("result")?.as_i64()
        })
        .filter(|id| *id != RECORDING_FAILED)
}
