/// 사용자별 관심 목록
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::query::handlers;
use tracing::info;

// endregion: --- Imports

/// 없는 상품이면 404
async fn ensure_listing_exists(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<(), AppError> {
    if handlers::listing_exists(db_manager, listing_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Listing {} not found.", listing_id)))
    }
}

/// 관심 목록에 추가 (이미 있으면 그대로)
pub async fn handle_add_to_watchlist(
    db_manager: &DatabaseManager,
    user_id: i64,
    listing_id: i64,
) -> Result<(), AppError> {
    info!(
        "{:<12} --> 관심 목록 추가 user: {}, listing: {}",
        "Command", user_id, listing_id
    );
    ensure_listing_exists(db_manager, listing_id).await?;

    sqlx::query(
        "INSERT INTO watchlist (user_id, listing_id) VALUES ($1, $2)
         ON CONFLICT (user_id, listing_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(listing_id)
    .execute(db_manager.pool())
    .await?;
    Ok(())
}

/// 관심 목록에서 제거 (없으면 그대로)
pub async fn handle_remove_from_watchlist(
    db_manager: &DatabaseManager,
    user_id: i64,
    listing_id: i64,
) -> Result<(), AppError> {
    info!(
        "{:<12} --> 관심 목록 제거 user: {}, listing: {}",
        "Command", user_id, listing_id
    );
    ensure_listing_exists(db_manager, listing_id).await?;

    sqlx::query("DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2")
        .bind(user_id)
        .bind(listing_id)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}
