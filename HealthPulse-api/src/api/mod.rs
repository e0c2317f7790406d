pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;

pub use state::AppState;

/// Create the application router
pub async fn create_application() -> Router {
    routes::create_app().await
}
