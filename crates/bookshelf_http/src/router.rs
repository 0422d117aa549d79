//! Route table and request logging middleware.

use crate::api;
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::info;
use std::time::Instant;

/// Builds the full application router.
///
/// - `GET /health`
/// - `GET|POST /books`
/// - `GET|PUT|DELETE /books/:id`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/books", get(api::list_books).post(api::create_book))
        .route(
            "/books/:id",
            get(api::get_book)
                .put(api::update_book)
                .delete(api::delete_book),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
