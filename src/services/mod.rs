mod assistant;
mod favorite;

pub use assistant::{AssistantService, quiz_schema};
pub use favorite::FavoriteService;
