// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{ATTEMPT_CAP, PASS_THRESHOLD_PERCENTAGE},
    error::AppError,
    models::{
        attempt::{AttemptView, CertificateCode, SubmitQuizRequest, SubmitQuizResponse},
        question::{AddQuestionRequest, PublicOption, PublicQuestion},
        quiz::{CreateQuizRequest, Quiz, QuizStatusResponse},
    },
    utils::html::clean_html,
};

/// Helper struct for fetching correct options from the database.
#[derive(sqlx::FromRow)]
struct CorrectOption {
    id: i64,
    question_id: i64,
}

/// Keeps only the answer entries whose key parses to a question ID.
/// JSON object keys arrive as strings; non-numeric keys are dropped rather
/// than failing the whole submission.
fn parse_answers(raw: &HashMap<String, i64>) -> HashMap<i64, i64> {
    raw.iter()
        .filter_map(|(key, option_id)| {
            key.trim().parse::<i64>().ok().map(|id| (id, *option_id))
        })
        .collect()
}

/// Scores a submission against the correct-option map.
/// Returns (score, total_answered). Questions the user did not answer are
/// not part of the denominator.
fn grade_answers(answers: &HashMap<i64, i64>, correct_by_question: &HashMap<i64, i64>) -> (i32, i32) {
    let mut score = 0;
    for (question_id, chosen_option) in answers {
        if correct_by_question.get(question_id) == Some(chosen_option) {
            score += 1;
        }
    }
    (score, answers.len() as i32)
}

fn score_percentage(score: i32, total_answered: i32) -> f64 {
    if total_answered > 0 {
        (score as f64 / total_answered as f64) * 100.0
    } else {
        0.0
    }
}

/// Creates a new quiz and links it to a specific training material.
/// Only one quiz can exist per material.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::InvalidRequest(validation_errors.to_string()));
    }

    let title = clean_html(&payload.title);

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (material_id, title) VALUES ($1, $2) RETURNING id",
    )
    .bind(payload.material_id)
    .bind(&title)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        let msg = e.to_string();
        if msg.contains("unique constraint") || msg.contains("23505") {
            AppError::Conflict("A quiz already exists for this material.".to_string())
        } else if msg.contains("foreign key") || msg.contains("23503") {
            AppError::NotFound("Training material not found".to_string())
        } else {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::Persistence(msg)
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "quiz_id": quiz_id })),
    ))
}

/// Adds a single question along with its multiple-choice options to a quiz.
///
/// * Validates shape before any write: text bounds, at least two options,
///   at least one marked correct.
/// * Question and option inserts share one transaction so a failure leaves
///   no partial question behind.
pub async fn add_question(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::InvalidRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let question_id: i64 = sqlx::query_scalar(
        "INSERT INTO questions (quiz_id, question_text) VALUES ($1, $2) RETURNING id",
    )
    .bind(quiz_id)
    .bind(clean_html(&payload.question_text))
    .fetch_one(&mut *tx)
    .await?;

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO options (question_id, option_text, is_correct) ");
    builder.push_values(payload.options.iter(), |mut b, opt| {
        b.push_bind(question_id)
            .push_bind(clean_html(&opt.option_text))
            .push_bind(opt.is_correct);
    });
    builder.build().execute(&mut *tx).await.map_err(|e| {
        tracing::error!("Failed to insert options for question {}: {:?}", question_id, e);
        AppError::Persistence(e.to_string())
    })?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "question_id": question_id })),
    ))
}

/// Deletes a quiz question by ID.
/// Associated options are removed by the database cascade.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(question_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::Persistence(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Helper struct for fetching question rows without joining options.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
}

/// Helper struct for fetching option rows for grouping under questions.
#[derive(sqlx::FromRow)]
struct OptionRow {
    id: i64,
    question_id: i64,
    option_text: String,
}

/// Fetches all questions for a quiz as shown to learners:
/// the `is_correct` flag never leaves the database.
pub async fn list_questions(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions: Vec<QuestionRow> = sqlx::query_as(
        "SELECT id, question_text FROM questions WHERE quiz_id = $1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    if questions.is_empty() {
        return Ok(Json(Vec::<PublicQuestion>::new()));
    }

    // Use QueryBuilder for dynamic IN clause
    let mut query_builder = QueryBuilder::<Postgres>::new(
        "SELECT id, question_id, option_text FROM options WHERE question_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for question in &questions {
        separated.push_bind(question.id);
    }
    separated.push_unseparated(") ORDER BY id");

    let option_rows: Vec<OptionRow> = query_builder.build_query_as().fetch_all(&pool).await?;

    let mut options_by_question: HashMap<i64, Vec<PublicOption>> = HashMap::new();
    for row in option_rows {
        options_by_question
            .entry(row.question_id)
            .or_default()
            .push(PublicOption {
                id: row.id,
                option_text: row.option_text,
            });
    }

    let public: Vec<PublicQuestion> = questions
        .into_iter()
        .map(|q| PublicQuestion {
            options: options_by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            question_text: q.question_text,
        })
        .collect();

    Ok(Json(public))
}

#[derive(Debug, Deserialize)]
pub struct QuizStatusParams {
    pub user_id: Option<i64>,
}

/// Fetches quiz details for a material ID, including the given user's
/// attempt history and how many attempts remain.
pub async fn get_quiz_status(
    State(pool): State<PgPool>,
    Path(material_id): Path<i64>,
    Query(params): Query<QuizStatusParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = params.user_id.ok_or_else(|| {
        AppError::InvalidRequest("User ID is required to fetch quiz status.".to_string())
    })?;

    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, material_id, title, created_at FROM quizzes WHERE material_id = $1",
    )
    .bind(material_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found for this material".to_string()))?;

    let attempts = sqlx::query_as::<_, AttemptView>(
        "SELECT score, total_questions, passed, attempted_at
         FROM quiz_attempts
         WHERE user_id = $1 AND quiz_id = $2
         ORDER BY attempted_at DESC, id DESC",
    )
    .bind(user_id)
    .bind(quiz.id)
    .fetch_all(&pool)
    .await?;

    let has_passed = attempts.iter().any(|a| a.passed);
    let attempts_made = attempts.len() as i64;
    let attempts_remaining = (ATTEMPT_CAP - attempts_made).max(0);

    Ok(Json(QuizStatusResponse {
        quiz,
        attempts,
        has_passed,
        attempts_made,
        attempts_remaining,
    }))
}

/// Processes a user's quiz submission: checks eligibility, scores the
/// answers, records the attempt, and issues a certificate on a pass.
///
/// * The eligibility check and the attempt insert run in one transaction
///   holding a per-(user, quiz) advisory lock, so concurrent submissions
///   cannot slip past the attempt cap or the already-passed gate on stale
///   counts.
/// * Certificate work happens after the attempt commits: a failure there
///   is reported as a missing certificate, never as a lost attempt.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.quiz_id <= 0 || req.user_id <= 0 || req.answers.is_empty() {
        return Err(AppError::InvalidRequest(
            "Missing required quiz ID, user ID, or valid answers.".to_string(),
        ));
    }

    let answers = parse_answers(&req.answers);
    if answers.is_empty() {
        return Err(AppError::InvalidRequest("No valid answers submitted.".to_string()));
    }

    let mut tx = pool.begin().await?;

    // Serializes submissions for this (user, quiz) pair until commit or
    // rollback. Truncating the ids to 32 bits can only widen the lock to
    // extra pairs, never split one pair across two locks.
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(req.user_id as i32)
        .bind(req.quiz_id as i32)
        .execute(&mut *tx)
        .await?;

    // Eligibility gate, before any scoring work.
    let (attempts_made, already_passed): (i64, Option<bool>) = sqlx::query_as(
        "SELECT COUNT(id), BOOL_OR(passed) FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
    )
    .bind(req.user_id)
    .bind(req.quiz_id)
    .fetch_one(&mut *tx)
    .await?;

    if already_passed.unwrap_or(false) {
        return Err(AppError::AlreadyPassed);
    }
    if attempts_made >= ATTEMPT_CAP {
        return Err(AppError::NoAttemptsRemaining);
    }

    // Correct options for exactly the answered questions; unanswered
    // questions do not count against the denominator.
    let mut query_builder = QueryBuilder::<Postgres>::new(
        "SELECT id, question_id FROM options WHERE is_correct = TRUE AND question_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for question_id in answers.keys() {
        separated.push_bind(*question_id);
    }
    separated.push_unseparated(")");

    let correct_options: Vec<CorrectOption> = query_builder
        .build_query_as()
        .fetch_all(&mut *tx)
        .await?;
    let correct_by_question: HashMap<i64, i64> = correct_options
        .into_iter()
        .map(|opt| (opt.question_id, opt.id))
        .collect();

    let (score, total_questions) = grade_answers(&answers, &correct_by_question);
    let percentage = score_percentage(score, total_questions);
    let passed = percentage >= PASS_THRESHOLD_PERCENTAGE;

    sqlx::query(
        "INSERT INTO quiz_attempts (user_id, quiz_id, score, total_questions, passed)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(req.user_id)
    .bind(req.quiz_id)
    .bind(score)
    .bind(total_questions)
    .bind(passed)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record quiz attempt: {:?}", e);
        AppError::Persistence(e.to_string())
    })?;

    tx.commit().await?;

    let certificate = if passed {
        issue_certificate(&pool, req.user_id, req.quiz_id).await
    } else {
        None
    };

    Ok(Json(SubmitQuizResponse {
        score,
        total_questions,
        passed,
        certificate,
    }))
}

/// Resolves the course behind a quiz and records the certification.
///
/// The insert is conditional on the UNIQUE (user_id, quiz_id) constraint,
/// so concurrent passing submissions converge on a single row, and the
/// authoritative code is read back afterwards. Any failure here is logged
/// as an inconsistency and surfaces as a missing certificate; the already
/// committed attempt stands.
async fn issue_certificate(pool: &PgPool, user_id: i64, quiz_id: i64) -> Option<CertificateCode> {
    let course_id = match sqlx::query_scalar::<_, i64>(
        "SELECT tm.course_id
         FROM quizzes q
         JOIN training_materials tm ON q.material_id = tm.id
         WHERE q.id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
    {
        Ok(Some(course_id)) => course_id,
        Ok(None) => {
            tracing::error!("Could not find course linked to quiz {}", quiz_id);
            return None;
        }
        Err(e) => {
            tracing::error!("Failed to resolve course for quiz {}: {:?}", quiz_id, e);
            return None;
        }
    };

    let certificate_code = Uuid::new_v4().to_string();

    let inserted = sqlx::query(
        "INSERT INTO certifications (user_id, course_id, quiz_id, certificate_code)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id, quiz_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(quiz_id)
    .bind(&certificate_code)
    .execute(pool)
    .await;

    if let Err(e) = inserted {
        tracing::error!(
            "Failed to record certification for user {} quiz {}: {:?}",
            user_id,
            quiz_id,
            e
        );
    }

    // Read back the authoritative code; a concurrent submission may have won.
    match sqlx::query_scalar::<_, String>(
        "SELECT certificate_code FROM certifications WHERE user_id = $1 AND quiz_id = $2",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
    {
        Ok(Some(code)) => Some(CertificateCode { code }),
        Ok(None) => {
            tracing::error!(
                "Certificate record inconsistency for user {}, quiz {}",
                user_id,
                quiz_id
            );
            None
        }
        Err(e) => {
            tracing::error!(
                "Failed to read back certificate for user {} quiz {}: {:?}",
                user_id,
                quiz_id,
                e
            );
            None
        }
    }
}
