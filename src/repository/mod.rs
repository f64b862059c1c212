mod favorite;

pub use favorite::{FavoriteRepository, FavoriteStore};
