// src/agent/mod.rs

pub mod client;
pub mod educator;
pub mod prompts;
pub mod tools;

use std::fmt;

pub use educator::EducatorAgent;

/// Outcome of a successful generation run.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedQuiz {
    pub session_id: i64,
    pub total_questions: i64,
}

/// Errors from the quiz-generation agent.
#[derive(Debug)]
pub enum AgentError {
    /// Transport-level failure talking to the model API.
    Http(reqwest::Error),

    /// Non-success status from the model API.
    Api { status: u16, message: String },

    /// The API answered 2xx but the body was not usable.
    InvalidResponse(String),

    /// The agent finished without recording a usable quiz session.
    NoSession,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Http(err) => write!(f, "HTTP error: {}", err),
            AgentError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            AgentError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
            AgentError::NoSession => {
                write!(f, "agent failed to initialize the quiz session")
            }
        }
    }
}

impl std::error::Error for AgentError {}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Http(err)
    }
}

/// The seam between the quiz flow and the LLM-driven generator.
///
/// Handlers receive an `Arc<dyn QuizAgent>` through `AppState`; tests
/// substitute a stub without touching the flow code.
#[async_trait::async_trait]
pub trait QuizAgent: Send + Sync {
    /// Generates a quiz for `topic`, persists it, and returns the new
    /// session identifier together with the fixed question count.
    async fn generate_quiz(&self, topic: &str) -> Result<GeneratedQuiz, AgentError>;
}
