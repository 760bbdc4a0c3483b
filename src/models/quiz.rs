// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::attempt::AttemptView;

/// Represents the 'quizzes' table in the database.
/// A quiz is tied 1:1 to a training material, enforced by the UNIQUE
/// constraint on `material_id`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    /// The training material this quiz assesses.
    pub material_id: i64,

    pub title: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a quiz for a training material.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(range(min = 1, message = "A valid material ID is required."))]
    pub material_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

/// Quiz details plus the requesting user's attempt history and derived
/// attempt accounting, as returned by the status endpoint.
#[derive(Debug, Serialize)]
pub struct QuizStatusResponse {
    #[serde(flatten)]
    pub quiz: Quiz,

    /// Attempt history, most recent first.
    pub attempts: Vec<AttemptView>,

    pub has_passed: bool,
    pub attempts_made: i64,
    pub attempts_remaining: i64,
}
