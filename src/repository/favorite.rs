use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::models::{Favorite, NewFavorite};

/// Storage for favorites. Each method is a single statement; nothing is cached.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn create(&self, favorite: &NewFavorite) -> Result<Favorite, sqlx::Error>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Favorite>, sqlx::Error>;

    /// Returns the number of rows removed, which may be zero.
    async fn delete(&self, user_id: &str, recipe_id: i32) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    #[instrument(
        name = "db.favorite.create",
        skip(self, favorite),
        fields(user_id = %favorite.user_id, recipe_id = favorite.recipe_id)
    )]
    async fn create(&self, favorite: &NewFavorite) -> Result<Favorite, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, recipe_id, title, image, cook_time, servings)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, recipe_id, title, image, cook_time, servings, created_at
            "#,
        )
        .bind(&favorite.user_id)
        .bind(favorite.recipe_id)
        .bind(&favorite.title)
        .bind(&favorite.image)
        .bind(&favorite.cook_time)
        .bind(favorite.servings)
        .fetch_one(&self.pool)
        .await
    }

    #[instrument(name = "db.favorite.list_by_user", skip(self))]
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, recipe_id, title, image, cook_time, servings, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(name = "db.favorite.delete", skip(self))]
    async fn delete(&self, user_id: &str, recipe_id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
