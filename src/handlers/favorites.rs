use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{AddFavoriteBody, Favorite, MessageResponse},
};

pub async fn add_favorite(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AddFavoriteBody>, AppError>,
) -> AppResult<(StatusCode, Json<Favorite>)> {
    let favorite = state.favorite_service.add(body).await?;

    Ok((StatusCode::CREATED, Json(favorite)))
}

pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Favorite>>> {
    let favorites = state.favorite_service.list(&user_id).await?;

    Ok(Json(favorites))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, recipe_id)): Path<(String, String)>,
) -> AppResult<Json<MessageResponse>> {
    state.favorite_service.remove(&user_id, &recipe_id).await?;

    Ok(Json(MessageResponse {
        message: "Favorite removed successfully".to_string(),
    }))
}
