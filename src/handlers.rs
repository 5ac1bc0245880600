// region:    --- Imports
use crate::accounts::commands::{handle_login, handle_logout, handle_register};
use crate::accounts::model::{LoginCommand, RegisterCommand, User};
use crate::accounts::session::{removal_cookie, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::bidding::commands::{handle_place_bid as command_place_bid, PlaceBidCommand};
use crate::bidding::model::{Bid, BidReceipt};
use crate::comments::{handle_add_comment as command_add_comment, AddCommentCommand, Comment};
use crate::error::AppError;
use crate::listing::commands::{
    handle_create_listing as command_create_listing, handle_finish_listing, Finish,
};
use crate::listing::model::{CreateListingCommand, Listing};
use crate::notifications::{handle_mark_all_read, Notification};
use crate::query;
use crate::state::AppState;
use crate::watchlist;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

type AppResult<T> = Result<T, AppError>;

/// 잘못된 요청 본문/경로/쿼리도 `{"error","code"}` 형식으로 응답
type JsonBody<T> = WithRejection<Json<T>, AppError>;
type ListingId = WithRejection<Path<i64>, AppError>;

// region:    --- Views
/// 상품 목록 필터
#[derive(Debug, Deserialize)]
pub struct ListingFilter {
    pub category: Option<String>,
}

/// 상품 상세
#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub bid_count: i64,
    pub highest_bid: Option<Bid>,
    pub comments: Vec<Comment>,
    pub viewer: Option<ViewerContext>,
}

/// 로그인한 사용자 기준 상세 정보
#[derive(Debug, Serialize, PartialEq)]
pub struct ViewerContext {
    pub watching: bool,
    pub is_seller: bool,
    pub is_high_bidder: bool,
    pub is_winner: bool,
}

impl ViewerContext {
    pub fn new(user_id: i64, listing: &Listing, highest_bid: Option<&Bid>, watching: bool) -> Self {
        Self {
            watching,
            is_seller: listing.seller_id == user_id,
            is_high_bidder: highest_bid.is_some_and(|bid| bid.bidder_id == user_id),
            is_winner: listing.winner_id == Some(user_id),
        }
    }
}

/// 관심 목록 변경 결과
#[derive(Debug, Serialize)]
pub struct WatchStatus {
    pub listing_id: i64,
    pub watching: bool,
}
// endregion: --- Views

// region:    --- Account Handlers

/// 회원가입
pub async fn handle_register_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(cmd), _): JsonBody<RegisterCommand>,
) -> AppResult<(CookieJar, (StatusCode, Json<User>))> {
    let (user, token) = handle_register(cmd, &state.db, state.config.session_ttl_hours).await?;
    Ok((
        jar.add(session_cookie(token)),
        (StatusCode::CREATED, Json(user)),
    ))
}

/// 로그인
pub async fn handle_login_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(cmd), _): JsonBody<LoginCommand>,
) -> AppResult<(CookieJar, Json<User>)> {
    let (user, token) = handle_login(cmd, &state.db, state.config.session_ttl_hours).await?;
    Ok((jar.add(session_cookie(token)), Json(user)))
}

/// 로그아웃
pub async fn handle_logout_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
    handle_logout(token.as_deref(), &state.db).await?;
    Ok((jar.remove(removal_cookie()), StatusCode::NO_CONTENT))
}

/// 현재 사용자
pub async fn handle_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

// endregion: --- Account Handlers

// region:    --- Command Handlers

/// 상품 등록
pub async fn handle_create_listing(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(cmd), _): JsonBody<CreateListingCommand>,
) -> AppResult<(StatusCode, Json<Listing>)> {
    let listing = command_create_listing(
        user.id,
        cmd,
        state.config.listing_duration_hours,
        state.event_store.as_ref(),
        &state.db,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// 입찰
pub async fn handle_place_bid(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
    WithRejection(Json(cmd), _): JsonBody<PlaceBidCommand>,
) -> AppResult<(StatusCode, Json<BidReceipt>)> {
    let receipt =
        command_place_bid(listing_id, user.id, cmd, state.event_store.as_ref(), &state.db).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// 댓글 작성
pub async fn handle_add_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
    WithRejection(Json(cmd), _): JsonBody<AddCommentCommand>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment =
        command_add_comment(listing_id, user.id, cmd, state.event_store.as_ref(), &state.db)
            .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// 경매 종료 (판매자만)
pub async fn handle_close_auction(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<Listing>> {
    let listing = handle_finish_listing(
        listing_id,
        Finish::BySeller(user.id),
        state.event_store.as_ref(),
        &state.db,
    )
    .await?;
    Ok(Json(listing))
}

/// 관심 목록 추가
pub async fn handle_watch(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<WatchStatus>> {
    watchlist::handle_add_to_watchlist(&state.db, user.id, listing_id).await?;
    Ok(Json(WatchStatus {
        listing_id,
        watching: true,
    }))
}

/// 관심 목록 제거
pub async fn handle_unwatch(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<WatchStatus>> {
    watchlist::handle_remove_from_watchlist(&state.db, user.id, listing_id).await?;
    Ok(Json(WatchStatus {
        listing_id,
        watching: false,
    }))
}

/// 알림 모두 읽음
pub async fn handle_mark_notifications_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let updated = handle_mark_all_read(&state.db, user.id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 진행 중인 상품 목록
pub async fn handle_index(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(filter), _): WithRejection<Query<ListingFilter>, AppError>,
) -> AppResult<Json<Vec<Listing>>> {
    let category = filter
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let listings = query::handlers::get_active_listings(&state.db, category).await?;
    Ok(Json(listings))
}

/// 상품 상세
pub async fn handle_listing_detail(
    State(state): State<Arc<AppState>>,
    viewer: Option<CurrentUser>,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<ListingDetail>> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "HandlerQuery", listing_id);
    let listing = query::handlers::get_listing(&state.db, listing_id).await?;
    let bid_count = query::handlers::get_bid_count(&state.db, listing_id).await?;
    let highest_bid = query::handlers::get_highest_bid(&state.db, listing_id).await?;
    let comments = query::handlers::get_comments(&state.db, listing_id).await?;

    let viewer = match viewer {
        Some(CurrentUser(user)) => {
            let watching = query::handlers::is_watching(&state.db, user.id, listing_id).await?;
            Some(ViewerContext::new(
                user.id,
                &listing,
                highest_bid.as_ref(),
                watching,
            ))
        }
        None => None,
    };

    Ok(Json(ListingDetail {
        listing,
        bid_count,
        highest_bid,
        comments,
        viewer,
    }))
}

/// 입찰 이력
pub async fn handle_bid_history(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<Vec<Bid>>> {
    // 없는 상품과 입찰 없는 상품을 구분
    query::handlers::get_listing(&state.db, listing_id).await?;
    let bids = query::handlers::get_bid_history(&state.db, listing_id).await?;
    Ok(Json(bids))
}

/// 댓글 목록
pub async fn handle_list_comments(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(listing_id), _): ListingId,
) -> AppResult<Json<Vec<Comment>>> {
    query::handlers::get_listing(&state.db, listing_id).await?;
    let comments = query::handlers::get_comments(&state.db, listing_id).await?;
    Ok(Json(comments))
}

/// 관심 목록
pub async fn handle_watchlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Listing>>> {
    let listings = query::handlers::get_watchlist(&state.db, user.id).await?;
    Ok(Json(listings))
}

/// 카테고리 목록
pub async fn handle_categories(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    let categories = query::handlers::get_categories(&state.db).await?;
    Ok(Json(categories))
}

/// 알림 목록
pub async fn handle_notifications(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = query::handlers::get_notifications(&state.db, user.id).await?;
    Ok(Json(notifications))
}

// endregion: --- Query Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::model::ListingStatus;
    use chrono::Utc;

    fn listing(seller_id: i64, winner_id: Option<i64>) -> Listing {
        let now = Utc::now();
        Listing {
            id: 3,
            title: "Chair".to_string(),
            description: "Wooden chair".to_string(),
            start_time: now,
            end_time: now,
            starting_bid: 500,
            current_price: 900,
            category: String::new(),
            image_url: None,
            status: ListingStatus::Closed.as_str().to_string(),
            seller_id,
            seller_username: "seller".to_string(),
            winner_id,
            created_at: now,
        }
    }

    fn bid(bidder_id: i64) -> Bid {
        Bid {
            id: 1,
            listing_id: 3,
            bidder_id,
            bidder_username: "bidder".to_string(),
            amount: 900,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_viewer_context_for_seller() {
        let ctx = ViewerContext::new(1, &listing(1, Some(2)), Some(&bid(2)), false);
        assert_eq!(
            ctx,
            ViewerContext {
                watching: false,
                is_seller: true,
                is_high_bidder: false,
                is_winner: false,
            }
        );
    }

    #[test]
    fn test_viewer_context_for_winner() {
        let ctx = ViewerContext::new(2, &listing(1, Some(2)), Some(&bid(2)), true);
        assert!(ctx.watching);
        assert!(!ctx.is_seller);
        assert!(ctx.is_high_bidder);
        assert!(ctx.is_winner);
    }

    #[test]
    fn test_viewer_context_without_bids() {
        let ctx = ViewerContext::new(5, &listing(1, None), None, false);
        assert!(!ctx.is_high_bidder);
        assert!(!ctx.is_winner);
    }
}
