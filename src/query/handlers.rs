// region:    --- Imports
use super::queries;
use crate::bidding::model::Bid;
use crate::comments::Comment;
use crate::database::DatabaseManager;
use crate::listing::model::Listing;
use crate::notifications::Notification;
use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;
use sqlx::{PgConnection, Row};
use tracing::info;

// endregion: --- Imports

/// 알림 조회 최대 개수
pub const NOTIFICATION_LIMIT: i64 = 50;

// region:    --- Connection Queries
/// 상품 조회 (진행 중인 트랜잭션 안에서)
pub async fn fetch_listing(conn: &mut PgConnection, listing_id: i64) -> Result<Listing, SqlxError> {
    sqlx::query_as::<_, Listing>(queries::GET_LISTING)
        .bind(listing_id)
        .fetch_one(&mut *conn)
        .await
}

/// 최고 입찰 조회 (진행 중인 트랜잭션 안에서)
pub async fn fetch_highest_bid(
    conn: &mut PgConnection,
    listing_id: i64,
) -> Result<Option<Bid>, SqlxError> {
    sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
        .bind(listing_id)
        .fetch_optional(&mut *conn)
        .await
}
// endregion: --- Connection Queries

// region:    --- Query Handlers

/// 상품 조회
pub async fn get_listing(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Listing, SqlxError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| Box::pin(async move { fetch_listing(&mut **tx, listing_id).await }))
        .await
}

/// 진행 중인 상품 조회
pub async fn get_active_listings(
    db_manager: &DatabaseManager,
    category: Option<String>,
) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 진행 중인 상품 조회 category: {:?}", "Query", category);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_ACTIVE_LISTINGS)
                    .bind(category)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 카테고리 목록 조회
pub async fn get_categories(db_manager: &DatabaseManager) -> Result<Vec<String>, SqlxError> {
    info!("{:<12} --> 카테고리 조회", "Query");
    sqlx::query_scalar::<_, String>(queries::GET_CATEGORIES)
        .fetch_all(db_manager.pool())
        .await
}

/// 입찰 이력 조회
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(listing_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 최고 입찰 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Bid>, SqlxError> {
    info!("{:<12} --> 최고 입찰 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| Box::pin(async move { fetch_highest_bid(&mut **tx, listing_id).await }))
        .await
}

/// 입찰 수 조회
pub async fn get_bid_count(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<i64, SqlxError> {
    sqlx::query_scalar::<_, i64>(queries::GET_BID_COUNT)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 댓글 조회
pub async fn get_comments(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Comment>, SqlxError> {
    info!("{:<12} --> 댓글 조회 id: {}", "Query", listing_id);
    sqlx::query_as::<_, Comment>(queries::GET_COMMENTS)
        .bind(listing_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 댓글 단건 조회
pub async fn get_comment(
    db_manager: &DatabaseManager,
    comment_id: i64,
) -> Result<Comment, SqlxError> {
    sqlx::query_as::<_, Comment>(queries::GET_COMMENT)
        .bind(comment_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 관심 목록 조회
pub async fn get_watchlist(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Listing>, SqlxError> {
    info!("{:<12} --> 관심 목록 조회 user_id: {}", "Query", user_id);
    sqlx::query_as::<_, Listing>(queries::GET_WATCHLIST)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 관심 목록 포함 여부
pub async fn is_watching(
    db_manager: &DatabaseManager,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, SqlxError> {
    sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
        .bind(user_id)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 상품 존재 여부
pub async fn listing_exists(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<bool, SqlxError> {
    sqlx::query_scalar::<_, bool>(queries::LISTING_EXISTS)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 상품 이벤트 버전 조회
pub async fn get_listing_version(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<i64, SqlxError> {
    info!("{:<12} --> 상품 이벤트 버전 조회 id: {}", "Query", listing_id);
    let row = sqlx::query(queries::GET_LISTING_VERSION)
        .bind(listing_id)
        .fetch_one(db_manager.pool())
        .await?;
    Ok(row.get("version"))
}

/// 종료 시간이 지난 진행 중 상품 id
pub async fn get_ended_active_listing_ids(
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<Vec<i64>, SqlxError> {
    sqlx::query_scalar::<_, i64>(queries::GET_ENDED_ACTIVE_LISTING_IDS)
        .bind(now)
        .fetch_all(db_manager.pool())
        .await
}

/// 알림 조회
pub async fn get_notifications(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Notification>, SqlxError> {
    info!("{:<12} --> 알림 조회 user_id: {}", "Query", user_id);
    sqlx::query_as::<_, Notification>(queries::GET_NOTIFICATIONS)
        .bind(user_id)
        .bind(NOTIFICATION_LIMIT)
        .fetch_all(db_manager.pool())
        .await
}

// endregion: --- Query Handlers
