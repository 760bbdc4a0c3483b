// src/handlers/certificate.rs

use axum::{Json, extract::{Path, State}, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, models::certification::CertificateResponse};

/// Fetches the certificate a user earned for a quiz, joined with the user,
/// course and quiz titles for display.
pub async fn get_certificate(
    State(pool): State<PgPool>,
    Path((user_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let certificate = sqlx::query_as::<_, CertificateResponse>(
        r#"
        SELECT
            c.id, c.user_id, c.course_id, c.quiz_id, c.certificate_code, c.issued_at,
            u.name AS user_name,
            co.title AS course_title,
            q.title AS quiz_title
        FROM certifications c
        JOIN users u ON c.user_id = u.id
        JOIN quizzes q ON c.quiz_id = q.id
        JOIN training_materials tm ON q.material_id = tm.id
        JOIN courses co ON tm.course_id = co.id
        WHERE c.user_id = $1 AND c.quiz_id = $2
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch certificate: {:?}", e);
        AppError::Persistence(e.to_string())
    })?
    .ok_or(AppError::NotFound("Certificate not found.".to_string()))?;

    Ok(Json(certificate))
}
