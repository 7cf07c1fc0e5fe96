pub mod accounts;
pub mod readings;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

/// The versioned API surface.
pub fn router(pool: SqlitePool) -> Router {
    let state = AppState { pool };

    let api = Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/:id",
            get(accounts::get_by_id)
                .put(accounts::edit)
                .delete(accounts::delete),
        )
        .route("/readings", get(readings::list).post(readings::create))
        .route(
            "/readings/:id",
            get(readings::get_by_id)
                .put(readings::edit)
                .delete(readings::delete),
        )
        .route("/readings/meter-reading-uploads", post(readings::upload))
        .with_state(state);

    Router::new().nest("/v1", api)
}
