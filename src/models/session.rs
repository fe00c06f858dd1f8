// src/models/session.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'quiz_sessions' table in the database.
/// One row per attempt at a generated quiz.
///
/// `status` is 'active' until the session is finalized, then 'completed'.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: i64,
    pub topic: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub total_score: i64,
}

/// Represents the 'user_answers' table in the database.
/// Correctness is captured at submission time and never recomputed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
    pub is_correct: bool,
}

/// DTO for requesting quiz generation.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizGenerateRequest {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
}

/// DTO returned once the agent has recorded a quiz.
#[derive(Debug, Serialize)]
pub struct QuizGenerateResponse {
    pub session_id: i64,
    pub total_questions: i64,
    pub message: String,
}

/// DTO for submitting an answer.
#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    pub session_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
}

/// DTO describing the outcome of a submitted answer.
#[derive(Debug, Serialize)]
pub struct AnswerValidationResponse {
    pub is_correct: bool,
    pub correct_choice_id: Option<i64>,
    pub explanation: Option<String>,
    pub next_question_available: bool,
}
