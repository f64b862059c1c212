use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{AddFavoriteBody, Favorite, NewFavorite},
    repository::FavoriteStore,
    telemetry::metrics::{FAVORITES_ADDED, FAVORITES_REMOVED},
};

#[derive(Clone)]
pub struct FavoriteService {
    store: Arc<dyn FavoriteStore>,
}

impl FavoriteService {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "favorites.add", skip(self, body))]
    pub async fn add(&self, body: AddFavoriteBody) -> AppResult<Favorite> {
        let new_favorite = NewFavorite::try_from(body)?;

        let favorite = self.store.create(&new_favorite).await?;

        FAVORITES_ADDED.add(1, &[]);
        tracing::info!(
            favorite_id = favorite.id,
            user_id = %favorite.user_id,
            recipe_id = favorite.recipe_id,
            "Favorite added"
        );

        Ok(favorite)
    }

    #[instrument(name = "favorites.list", skip(self))]
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<Favorite>> {
        let favorites = self.store.list_by_user(user_id).await?;

        tracing::debug!(count = favorites.len(), "Favorites listed");

        Ok(favorites)
    }

    /// `recipe_id` is the raw path segment. A value that is not an integer cannot match
    /// any stored row, so it is treated as an empty delete.
    #[instrument(name = "favorites.remove", skip(self))]
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<u64> {
        let Ok(recipe_id) = recipe_id.parse::<i32>() else {
            tracing::debug!(recipe_id, "Non-numeric recipe id, nothing to remove");
            return Ok(0);
        };

        let removed = self.store.delete(user_id, recipe_id).await?;

        if removed > 0 {
            FAVORITES_REMOVED.add(removed, &[]);
        }
        tracing::info!(user_id, recipe_id, removed, "Favorite removed");

        Ok(removed)
    }
}
