// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO for sending an answer option to learners (excludes `is_correct`).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub option_text: String,
}

/// DTO for a question as shown to learners taking the quiz.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<PublicOption>,
}

/// One option in a question-authoring request.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewOptionInput {
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for adding a question with its options to a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<NewOptionInput>,
}

/// A question needs at least two options and at least one marked correct,
/// checked before anything is written.
fn validate_options(options: &[NewOptionInput]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options"));
    }
    if !options.iter().any(|opt| opt.is_correct) {
        return Err(validator::ValidationError::new("no_correct_option"));
    }
    for opt in options {
        if opt.option_text.is_empty() || opt.option_text.len() > 500 {
            return Err(validator::ValidationError::new("option_text_length"));
        }
    }
    Ok(())
}
