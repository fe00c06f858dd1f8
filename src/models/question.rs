// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'questions' table in the database.
///
/// `topic` is a denormalized copy of the owning session's topic and is
/// what ties a generated batch of questions to a quiz session.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub topic: String,

    /// 1-based presentation position within the generated batch.
    pub ordinal: i64,
}

/// Represents the 'choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub choice_text: String,
    pub is_correct: bool,
    pub question_id: i64,
}

/// DTO for sending a choice to the client (excludes the correctness flag).
#[derive(Debug, Serialize, FromRow)]
pub struct ChoiceView {
    pub id: i64,
    pub choice_text: String,
}

/// DTO for serving the next question of a session.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub question_text: String,
    pub choices: Vec<ChoiceView>,
    pub current_number: i64,
    pub total_questions: i64,
}
