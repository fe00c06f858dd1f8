// tests/quiz_api_tests.rs

use std::sync::Arc;

use async_trait::async_trait;
use quizzly_backend::agent::tools::{self, ChoiceSpec, QuestionSpec};
use quizzly_backend::agent::{AgentError, GeneratedQuiz, QuizAgent};
use quizzly_backend::config::Config;
use quizzly_backend::routes;
use quizzly_backend::state::AppState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Stub agent that records a canned five-question quiz through the same
/// capability the real agent uses.
struct StubAgent {
    pool: SqlitePool,
}

#[async_trait]
impl QuizAgent for StubAgent {
    async fn generate_quiz(&self, topic: &str) -> Result<GeneratedQuiz, AgentError> {
        let session_id = tools::initialize_quiz_session(&self.pool, topic, &canned_questions())
            .await
            .map_err(|_| AgentError::NoSession)?;
        Ok(GeneratedQuiz {
            session_id,
            total_questions: 5,
        })
    }
}

/// Stub agent that never produces a usable session.
struct FailingAgent;

#[async_trait]
impl QuizAgent for FailingAgent {
    async fn generate_quiz(&self, _topic: &str) -> Result<GeneratedQuiz, AgentError> {
        Err(AgentError::NoSession)
    }
}

fn canned_questions() -> Vec<QuestionSpec> {
    (1..=5)
        .map(|n| QuestionSpec {
            question_text: format!("Question {}", n),
            choices: vec![
                ChoiceSpec {
                    choice_text: format!("Correct {}", n),
                    is_correct: true,
                },
                ChoiceSpec {
                    choice_text: "Wrong A".to_string(),
                    is_correct: false,
                },
                ChoiceSpec {
                    choice_text: "Wrong B".to_string(),
                    is_correct: false,
                },
                ChoiceSpec {
                    choice_text: "Wrong C".to_string(),
                    is_correct: false,
                },
            ],
        })
        .collect()
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        open_router_api_key: "test-key".to_string(),
        openrouter_api_base: "http://127.0.0.1:1".to_string(),
        openrouter_model: "test-model".to_string(),
        openrouter_max_tokens: 256,
        openrouter_temperature: 0.0,
        rust_log: "error".to_string(),
    }
}

/// Helper to spawn the app on a random port for testing.
/// Returns the base URL and the pool backing the app, for seeding and
/// assertions against storage.
async fn spawn_app_with<F>(make_agent: F) -> (String, SqlitePool)
where
    F: FnOnce(SqlitePool) -> Arc<dyn QuizAgent>,
{
    // A single connection keeps every request on the same in-memory
    // database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let state = AppState {
        pool: pool.clone(),
        config: test_config(),
        agent: make_agent(pool.clone()),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

async fn spawn_app() -> (String, SqlitePool) {
    spawn_app_with(|pool| Arc::new(StubAgent { pool })).await
}

/// Generates a quiz through the API and returns its session id.
async fn generate_session(client: &reqwest::Client, address: &str, topic: &str) -> i64 {
    let response = client
        .post(format!("{}/quiz/generate", address))
        .json(&serde_json::json!({ "topic": topic }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["session_id"].as_i64().expect("session_id missing")
}

async fn correct_choice_id(pool: &SqlitePool, question_id: i64) -> i64 {
    sqlx::query_scalar("SELECT id FROM choices WHERE question_id = ? AND is_correct = TRUE")
        .bind(question_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn wrong_choice_id(pool: &SqlitePool, question_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT id FROM choices WHERE question_id = ? AND is_correct = FALSE ORDER BY id LIMIT 1",
    )
    .bind(question_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn liveness_route_works() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&address)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Quiz"));
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn generate_returns_new_session() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quiz/generate", address))
        .json(&serde_json::json!({ "topic": "Python" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let session_id = body["session_id"].as_i64().unwrap();
    assert!(session_id > 0);
    assert_eq!(body["total_questions"], 5);
    assert!(body["message"].as_str().unwrap().contains("generated successfully"));

    let status: String = sqlx::query_scalar("SELECT status FROM quiz_sessions WHERE id = ?")
        .bind(session_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "active");
}

#[tokio::test]
async fn generate_reports_agent_failure() {
    let (address, _pool) = spawn_app_with(|_| Arc::new(FailingAgent)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quiz/generate", address))
        .json(&serde_json::json!({ "topic": "Python" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn generate_rejects_empty_topic() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quiz/generate", address))
        .json(&serde_json::json!({ "topic": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn next_returns_first_unanswered_question() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    let response = client
        .get(format!("{}/quiz/next?session_id={}", address, session_id))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["question_text"], "Question 1");
    assert_eq!(body["current_number"], 1);
    assert_eq!(body["total_questions"], 5);

    let choices = body["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 4);
    // Correctness is never exposed to the client.
    assert!(choices[0].get("is_correct").is_none());
    assert!(choices[0]["choice_text"].is_string());
}

#[tokio::test]
async fn next_unknown_session_is_not_found() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/quiz/next?session_id=9999", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submit_correct_answer_increments_score() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    let next: serde_json::Value = client
        .get(format!("{}/quiz/next?session_id={}", address, session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = next["id"].as_i64().unwrap();
    let choice_id = correct_choice_id(&pool, question_id).await;

    let response = client
        .post(format!("{}/quiz/submit", address))
        .json(&serde_json::json!({
            "session_id": session_id,
            "question_id": question_id,
            "choice_id": choice_id
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_correct"], true);
    assert!(body["correct_choice_id"].is_null());
    assert!(body["explanation"].is_null());
    assert_eq!(body["next_question_available"], true);

    let total_score: i64 =
        sqlx::query_scalar("SELECT total_score FROM quiz_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total_score, 1);
}

#[tokio::test]
async fn submit_wrong_answer_returns_correct_choice() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    let next: serde_json::Value = client
        .get(format!("{}/quiz/next?session_id={}", address, session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = next["id"].as_i64().unwrap();
    let wrong_id = wrong_choice_id(&pool, question_id).await;
    let expected_correct = correct_choice_id(&pool, question_id).await;

    let response = client
        .post(format!("{}/quiz/submit", address))
        .json(&serde_json::json!({
            "session_id": session_id,
            "question_id": question_id,
            "choice_id": wrong_id
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["is_correct"], false);
    assert_eq!(body["correct_choice_id"].as_i64().unwrap(), expected_correct);
    assert!(body["explanation"].as_str().unwrap().contains("Correct 1"));

    // Wrong answers never move the score.
    let total_score: i64 =
        sqlx::query_scalar("SELECT total_score FROM quiz_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total_score, 0);
}

#[tokio::test]
async fn submit_with_missing_entities_is_not_found() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quiz/submit", address))
        .json(&serde_json::json!({
            "session_id": 9999,
            "question_id": 9999,
            "choice_id": 9999
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn full_quiz_flow_scores_and_finalizes() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    // Answer all five questions: four correctly, the third one wrong.
    let mut served_question_ids = Vec::new();
    for round in 1..=5 {
        let next: serde_json::Value = client
            .get(format!("{}/quiz/next?session_id={}", address, session_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(next["current_number"], round);

        let question_id = next["id"].as_i64().unwrap();
        assert!(
            !served_question_ids.contains(&question_id),
            "next served an already answered question"
        );
        served_question_ids.push(question_id);

        let choice_id = if round == 3 {
            wrong_choice_id(&pool, question_id).await
        } else {
            correct_choice_id(&pool, question_id).await
        };

        let submit: serde_json::Value = client
            .post(format!("{}/quiz/submit", address))
            .json(&serde_json::json!({
                "session_id": session_id,
                "question_id": question_id,
                "choice_id": choice_id
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(submit["next_question_available"], round < 5);
    }

    // The quiz is exhausted now.
    let exhausted = client
        .get(format!("{}/quiz/next?session_id={}", address, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(exhausted.status().as_u16(), 400);

    // Finalize: 4 of 5 correct.
    let response = client
        .post(format!("{}/quiz/finalize", address))
        .json(&serde_json::json!({
            "session_id": session_id,
            "user_name": "Test User",
            "user_email": "test@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user_name"], "Test User");
    assert_eq!(body["topic"], "Python");
    assert_eq!(body["score"], 4);
    assert_eq!(body["total_questions"], 5);
    assert_eq!(body["percentage"].as_f64().unwrap(), 80.0);
    assert!(body["completed_at"].is_string());

    let status: String = sqlx::query_scalar("SELECT status FROM quiz_sessions WHERE id = ?")
        .bind(session_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "completed");
}

#[tokio::test]
async fn finalize_unknown_session_is_not_found() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quiz/finalize", address))
        .json(&serde_json::json!({
            "session_id": 9999,
            "user_name": "Test User",
            "user_email": "test@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn finalize_rejects_invalid_email() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    let response = client
        .post(format!("{}/quiz/finalize", address))
        .json(&serde_json::json!({
            "session_id": session_id,
            "user_name": "Test User",
            "user_email": "not-an-email"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn finalize_twice_archives_two_result_rows() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let session_id = generate_session(&client, &address, "Python").await;

    let payload = serde_json::json!({
        "session_id": session_id,
        "user_name": "Test User",
        "user_email": "test@example.com"
    });

    let first: serde_json::Value = client
        .post(format!("{}/quiz/finalize", address))
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = client
        .post(format!("{}/quiz/finalize", address))
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["score"], second["score"]);

    let result_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(result_count, 2);
}
