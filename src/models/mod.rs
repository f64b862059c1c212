mod assistant;
mod favorite;

pub use assistant::{ChatRequest, ChatResponse, QuizQuestion, QuizRequest, QuizResponse};
pub use favorite::{AddFavoriteBody, Favorite, MISSING_FIELDS, MessageResponse, NewFavorite};
