// src/models/certification.rs

use serde::Serialize;
use sqlx::FromRow;

/// Certificate record joined with display names, for the lookup endpoint.
/// Joined from `certifications`, `users`, `quizzes`, `training_materials`
/// and `courses`.
#[derive(Debug, Serialize, FromRow)]
pub struct CertificateResponse {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub quiz_id: i64,
    pub certificate_code: String,
    pub issued_at: Option<chrono::DateTime<chrono::Utc>>,

    pub user_name: String,
    pub course_title: String,
    pub quiz_title: String,
}
