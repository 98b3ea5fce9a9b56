//! Awareness quiz handlers

use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::quiz::{self, Feedback, QuestionView, QuizResult, PASS_THRESHOLD};
use crate::AppResult;

#[derive(Debug, Serialize)]
pub struct QuizView {
    pub questions: Vec<QuestionView>,
    pub pass_threshold: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    pub question: usize,
    #[validate(length(min = 1))]
    pub selected: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1))]
    pub answers: Vec<String>,
}

/// List questions and options
pub async fn list() -> Json<QuizView> {
    Json(QuizView {
        questions: quiz::questions(),
        pass_threshold: PASS_THRESHOLD,
    })
}

/// Immediate feedback for one answer
pub async fn answer(Json(req): Json<AnswerRequest>) -> AppResult<Json<Feedback>> {
    req.validate()?;
    let feedback = quiz::check(req.question, &req.selected)?;
    Ok(Json(feedback))
}

/// Grade a full submission
pub async fn submit(Json(req): Json<SubmitRequest>) -> AppResult<Json<QuizResult>> {
    req.validate()?;
    let result = quiz::grade(&req.answers)?;

    tracing::info!(
        "Quiz submitted: {}/{} ({})",
        result.score,
        result.total,
        if result.passed { "passed" } else { "failed" }
    );

    Ok(Json(result))
}
