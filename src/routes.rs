// region:    --- Imports
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// endregion: --- Imports

/// 요청 바디 최대 크기 (1MB)
const BODY_LIMIT: usize = 1024 * 1024;

/// 라우터 설정
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // 계정
        .route("/register", post(handlers::handle_register_user))
        .route("/login", post(handlers::handle_login_user))
        .route("/logout", post(handlers::handle_logout_user))
        .route("/me", get(handlers::handle_me))
        // 상품
        .route("/", get(handlers::handle_index))
        .route(
            "/listings",
            get(handlers::handle_index).post(handlers::handle_create_listing),
        )
        .route("/listings/:id", get(handlers::handle_listing_detail))
        .route(
            "/listings/:id/bids",
            get(handlers::handle_bid_history).post(handlers::handle_place_bid),
        )
        .route(
            "/listings/:id/comments",
            get(handlers::handle_list_comments).post(handlers::handle_add_comment),
        )
        .route("/listings/:id/close", post(handlers::handle_close_auction))
        .route(
            "/listings/:id/watch",
            post(handlers::handle_watch).delete(handlers::handle_unwatch),
        )
        .route("/categories", get(handlers::handle_categories))
        // 사용자별
        .route("/watchlist", get(handlers::handle_watchlist))
        .route("/notifications", get(handlers::handle_notifications))
        .route(
            "/notifications/read",
            post(handlers::handle_mark_notifications_read),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
