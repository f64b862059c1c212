pub mod ai;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;

pub use config::Config;

use services::{AssistantService, FavoriteService};

#[derive(Clone)]
pub struct AppState {
    pub favorite_service: FavoriteService,
    pub assistant_service: AssistantService,
}
