use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i32,
    pub user_id: String,
    pub recipe_id: i32,
    pub title: String,
    pub image: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Body of `POST /api/favorites` as sent by the client. Every field is optional here so
/// that missing values surface as a validation error rather than a body rejection.
/// Empty strings and a zero `recipeId` count as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteBody {
    pub user_id: Option<String>,
    pub recipe_id: Option<i32>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<i32>,
}

/// A favorite that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub user_id: String,
    pub recipe_id: i32,
    pub title: String,
    pub image: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<i32>,
}

pub const MISSING_FIELDS: &str = "Missing required fields";

impl TryFrom<AddFavoriteBody> for NewFavorite {
    type Error = AppError;

    fn try_from(body: AddFavoriteBody) -> Result<Self, Self::Error> {
        let user_id = body.user_id.filter(|v| !v.is_empty());
        let recipe_id = body.recipe_id.filter(|v| *v != 0);
        let title = body.title.filter(|v| !v.is_empty());

        match (user_id, recipe_id, title) {
            (Some(user_id), Some(recipe_id), Some(title)) => Ok(NewFavorite {
                user_id,
                recipe_id,
                title,
                image: body.image,
                cook_time: body.cook_time,
                servings: body.servings,
            }),
            _ => Err(AppError::Validation(MISSING_FIELDS.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
