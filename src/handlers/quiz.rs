// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::{Choice, ChoiceView, Question, QuestionResponse},
        result::{QuizFinalizeRequest, QuizResult, QuizResultResponse},
        session::{
            AnswerSubmission, AnswerValidationResponse, QuizGenerateRequest, QuizGenerateResponse,
            QuizSession,
        },
    },
    state::AppState,
};

/// Every generated quiz is expected to carry this many questions.
const TOTAL_QUESTIONS: i64 = 5;

/// Generates a new quiz for a topic.
///
/// Delegates the authoring and persistence to the injected agent, then
/// hands the resulting session id back to the client. The agent recording
/// fewer or more questions than expected is not checked here.
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<QuizGenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let quiz = state.agent.generate_quiz(&payload.topic).await.map_err(|e| {
        tracing::error!("Quiz generation failed for topic '{}': {}", payload.topic, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(QuizGenerateResponse {
        session_id: quiz.session_id,
        total_questions: quiz.total_questions,
        message: "Your quiz has been generated successfully! You can now start the test."
            .to_string(),
    }))
}

/// Query parameters for fetching the next question.
#[derive(Debug, Deserialize)]
pub struct NextQuestionParams {
    pub session_id: i64,
}

/// Serves the next unanswered question of a session.
///
/// Questions are selected by their recorded ordinal within the session's
/// topic; running out of questions is reported as a client error.
pub async fn next_question(
    State(pool): State<SqlitePool>,
    Query(params): Query<NextQuestionParams>,
) -> Result<impl IntoResponse, AppError> {
    let session = sqlx::query_as::<_, QuizSession>(
        "SELECT id, topic, created_at, status, total_score FROM quiz_sessions WHERE id = ?",
    )
    .bind(params.session_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Session not found".to_string()))?;

    let answered_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_answers WHERE session_id = ?")
            .bind(params.session_id)
            .fetch_one(&pool)
            .await?;

    let next_q = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question_text, topic, ordinal
        FROM questions
        WHERE topic = ?
          AND id NOT IN (SELECT question_id FROM user_answers WHERE session_id = ?)
        ORDER BY ordinal ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(&session.topic)
    .bind(params.session_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::BadRequest("No more questions available.".to_string()))?;

    let choices = sqlx::query_as::<_, ChoiceView>(
        "SELECT id, choice_text FROM choices WHERE question_id = ? ORDER BY id",
    )
    .bind(next_q.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(QuestionResponse {
        id: next_q.id,
        question_text: next_q.question_text,
        choices,
        current_number: answered_count + 1,
        total_questions: TOTAL_QUESTIONS,
    }))
}

/// Records a submitted answer and reports its correctness.
///
/// The answer row and the score increment commit together; the increment
/// happens in the database so concurrent submits cannot lose updates.
pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let session = sqlx::query_as::<_, QuizSession>(
        "SELECT id, topic, created_at, status, total_score FROM quiz_sessions WHERE id = ?",
    )
    .bind(submission.session_id)
    .fetch_optional(&pool)
    .await?;

    let question = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, topic, ordinal FROM questions WHERE id = ?",
    )
    .bind(submission.question_id)
    .fetch_optional(&pool)
    .await?;

    let choice = sqlx::query_as::<_, Choice>(
        "SELECT id, choice_text, is_correct, question_id FROM choices WHERE id = ?",
    )
    .bind(submission.choice_id)
    .fetch_optional(&pool)
    .await?;

    let (Some(_session), Some(question), Some(choice)) = (session, question, choice) else {
        return Err(AppError::NotFound(
            "Session, Question, or Choice not found".to_string(),
        ));
    };

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO user_answers (session_id, question_id, choice_id, is_correct) VALUES (?, ?, ?, ?)",
    )
    .bind(submission.session_id)
    .bind(submission.question_id)
    .bind(submission.choice_id)
    .bind(choice.is_correct)
    .execute(&mut *tx)
    .await?;

    if choice.is_correct {
        sqlx::query("UPDATE quiz_sessions SET total_score = total_score + 1 WHERE id = ?")
            .bind(submission.session_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let mut correct_choice_id = None;
    let mut explanation = None;
    if !choice.is_correct {
        let correct_choice = sqlx::query_as::<_, Choice>(
            "SELECT id, choice_text, is_correct, question_id FROM choices WHERE question_id = ? AND is_correct = TRUE",
        )
        .bind(question.id)
        .fetch_optional(&pool)
        .await?;

        correct_choice_id = correct_choice.as_ref().map(|c| c.id);
        let correct_text = correct_choice
            .as_ref()
            .map(|c| c.choice_text.as_str())
            .unwrap_or("unknown");
        explanation = Some(format!(
            "The correct answer is '{}'. This is the most accurate option based on the question requirements.",
            correct_text
        ));
    }

    let answered_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_answers WHERE session_id = ?")
            .bind(submission.session_id)
            .fetch_one(&pool)
            .await?;

    Ok(Json(AnswerValidationResponse {
        is_correct: choice.is_correct,
        correct_choice_id,
        explanation,
        next_question_available: answered_count < TOTAL_QUESTIONS,
    }))
}

/// Finalizes a session: archives the score under the submitter's name and
/// marks the session completed.
///
/// Deliberately not idempotent; a repeated call archives a second result
/// row with the same score.
pub async fn finalize_quiz(
    State(pool): State<SqlitePool>,
    Json(payload): Json<QuizFinalizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let session = sqlx::query_as::<_, QuizSession>(
        "SELECT id, topic, created_at, status, total_score FROM quiz_sessions WHERE id = ?",
    )
    .bind(payload.session_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Session not found".to_string()))?;

    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO quiz_results (user_name, user_email, topic, score, total_questions)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, user_name, user_email, topic, score, total_questions, completed_at
        "#,
    )
    .bind(&payload.user_name)
    .bind(&payload.user_email)
    .bind(&session.topic)
    .bind(session.total_score)
    .bind(TOTAL_QUESTIONS)
    .fetch_one(&pool)
    .await?;

    sqlx::query("UPDATE quiz_sessions SET status = 'completed' WHERE id = ?")
        .bind(payload.session_id)
        .execute(&pool)
        .await?;

    Ok(Json(QuizResultResponse {
        user_name: result.user_name,
        topic: result.topic,
        score: result.score,
        total_questions: result.total_questions,
        percentage: (result.score as f64 / TOTAL_QUESTIONS as f64) * 100.0,
        completed_at: result.completed_at,
    }))
}
