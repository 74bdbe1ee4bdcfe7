use axum::{Router, http::Method, routing::get};
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};

use crate::prediction::PredictionService;
use crate::web::routes::prediction_routes;

pub mod error;
pub mod models;
pub mod routes;
pub mod views;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub templates: Arc<Tera>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(service: Arc<PredictionService>, templates: Arc<Tera>) -> Router {
    let app_state = Arc::new(AppState { service, templates });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .merge(prediction_routes::create_page_router())
        .nest("/api", prediction_routes::create_api_router())
        .with_state(app_state)
        .layer(cors)
}
