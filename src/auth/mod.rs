use crate::{config::FeatureFlags, state::AppState};
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
mod password;
pub mod repo;
pub mod repo_types;
mod services;

pub fn router(features: &FeatureFlags) -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes(features))
        .merge(handlers::me_routes())
}
