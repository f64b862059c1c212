use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ChatRequest, ChatResponse, QuizRequest, QuizResponse},
};

pub async fn chat(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ChatRequest>, AppError>,
) -> AppResult<Json<ChatResponse>> {
    let response = state
        .assistant_service
        .chat(&body.user_message, &body.recipe_context)
        .await?;

    Ok(Json(ChatResponse { response }))
}

pub async fn quiz(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<QuizRequest>, AppError>,
) -> AppResult<Json<QuizResponse>> {
    let quiz = state.assistant_service.quiz(&body.recipe_context).await?;

    Ok(Json(QuizResponse { quiz }))
}
