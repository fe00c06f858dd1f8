// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'quiz_results' table in the database.
/// Archival snapshot written at finalize time; intentionally not linked
/// back to the session row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub user_name: String,
    pub user_email: String,
    pub topic: String,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for finalizing a session.
#[derive(Debug, Deserialize, Validate)]
pub struct QuizFinalizeRequest {
    pub session_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
    #[validate(email)]
    pub user_email: String,
}

/// DTO returned after a session has been finalized.
#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub user_name: String,
    pub topic: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: f64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}
