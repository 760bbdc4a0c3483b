// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// One row of the append-only 'quiz_attempts' log, as shown in the
/// status endpoint's attempt history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptView {
    pub score: i32,

    /// Number of questions the user actually answered in this submission.
    pub total_questions: i32,

    pub passed: bool,

    pub attempted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting quiz answers.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: i64,
    pub user_id: i64,

    /// User's answers map.
    /// Key: Question ID (JSON object keys arrive as strings)
    /// Value: the chosen option ID
    pub answers: HashMap<String, i64>,
}

/// Certificate reference returned with a passing submission.
#[derive(Debug, Serialize)]
pub struct CertificateCode {
    pub code: String,
}

/// Result of a scored submission.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub score: i32,
    pub total_questions: i32,
    pub passed: bool,

    /// Present when the attempt passed and the certificate chain resolved.
    pub certificate: Option<CertificateCode>,
}
