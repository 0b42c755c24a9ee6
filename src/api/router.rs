use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, check_books, check_members, create_book, delete_book, get_book_detail,
    list_books, list_loans, list_members, login, profile, refresh_token, register, return_book,
    update_book, update_stock,
};

/// Creates the API router with all lending endpoints
///
/// Everything except the health check is mounted under `/api`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let members = Router::new()
        .route("/", get(list_members))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile/:id", get(profile))
        .route("/refresh-token", post(refresh_token))
        .route("/refreshToken", post(refresh_token));

    let books = Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/detail/:code", get(get_book_detail))
        .route(
            "/:id",
            put(update_book).patch(update_stock).delete(delete_book),
        );

    let loans = Router::new()
        .route("/borrow", post(borrow_book))
        .route("/return", post(return_book))
        .route("/check-books", get(check_books))
        .route("/check-members", get(check_members))
        .route("/all", get(list_loans));

    let api = Router::new()
        .nest("/members", members)
        .nest("/books", books)
        .nest("/loans", loans);

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .nest("/api", api)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
