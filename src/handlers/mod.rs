mod assistant;
mod favorites;
mod health;

pub use assistant::{chat, quiz};
pub use favorites::{add_favorite, list_favorites, remove_favorite};
pub use health::health_check;
