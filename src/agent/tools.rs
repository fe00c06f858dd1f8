// src/agent/tools.rs
//
// The two capabilities exposed to the educator agent. Storage access from
// the agent goes through these and nothing else.

use serde::Deserialize;
use sqlx::SqlitePool;

use super::client::ToolDefinition;

/// Sentinel returned to the model when recording a quiz fails.
pub const RECORDING_FAILED: i64 = -1;

/// Argument payload for `initialize_quiz_session`.
#[derive(Debug, Deserialize)]
pub struct InitializeQuizArgs {
    pub topic: String,
    pub questions_data: Vec<QuestionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionSpec {
    pub question_text: String,
    pub choices: Vec<ChoiceSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceSpec {
    pub choice_text: String,
    pub is_correct: bool,
}

/// Argument payload for `get_educational_context`.
#[derive(Debug, Deserialize)]
pub struct ContextArgs {
    pub topic: String,
}

/// Creates a quiz session and persists the generated questions and
/// choices, all inside one transaction. A failure anywhere rolls the
/// whole batch back, session row included.
///
/// Returns the id of the newly created session.
pub async fn initialize_quiz_session(
    pool: &SqlitePool,
    topic: &str,
    questions: &[QuestionSpec],
) -> Result<i64, sqlx::Error> {
    tracing::info!("initialize_quiz_session called for topic: {}", topic);

    let mut tx = pool.begin().await?;

    let session_id = sqlx::query("INSERT INTO quiz_sessions (topic) VALUES (?)")
        .bind(topic)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for (index, question) in questions.iter().enumerate() {
        let question_id = sqlx::query(
            "INSERT INTO questions (question_text, topic, ordinal) VALUES (?, ?, ?)",
        )
        .bind(&question.question_text)
        .bind(topic)
        .bind((index + 1) as i64)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for choice in &question.choices {
            sqlx::query("INSERT INTO choices (choice_text, is_correct, question_id) VALUES (?, ?, ?)")
                .bind(&choice.choice_text)
                .bind(choice.is_correct)
                .bind(question_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    tracing::info!("Successfully saved quiz session {}", session_id);
    Ok(session_id)
}

/// Provides pedagogical guidance for a topic. No storage access; a pure
/// function of the input.
pub fn get_educational_context(topic: &str) -> String {
    format!(
        "Focus on core concepts, common misconceptions, and practical applications of {}.",
        topic
    )
}

/// Tool definitions advertised to the model on every request.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            "initialize_quiz_session",
            "Initializes a new quiz session and saves the generated questions and choices to the database. Returns the unique ID of the newly created session.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "The subject of the quiz."
                    },
                    "questions_data": {
                        "type": "array",
                        "description": "The generated questions.",
                        "items": {
                            "type": "object",
                            "properties": {
                                "question_text": {"type": "string"},
                                "choices": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "choice_text": {"type": "string"},
                                            "is_correct": {"type": "boolean"}
                                        },
                                        "required": ["choice_text", "is_correct"]
                                    }
                                }
                            },
                            "required": ["question_text", "choices"]
                        }
                    }
                },
                "required": ["topic", "questions_data"]
            }),
        ),
        ToolDefinition::function(
            "get_educational_context",
            "Provides educational guidelines for a specific topic to help generate more accurate and challenging questions.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string"}
                },
                "required": ["topic"]
            }),
        ),
    ]
}
