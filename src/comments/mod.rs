/// 상품 댓글
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{EventStore, MAX_RETRIES};
use crate::listing::events::ListingEvent;
use crate::query::handlers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

pub const CONTENT_MAX_LEN: usize = 2000;

// region:    --- Model
// 댓글 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub commenter_id: i64,
    pub commenter_username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

// 댓글 작성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentCommand {
    pub content: String,
}

/// 앞뒤 공백 제거 후 검증
pub fn normalize_content(content: &str) -> Result<String, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty.".to_string()));
    }
    if content.chars().count() > CONTENT_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters.",
            CONTENT_MAX_LEN
        )));
    }
    Ok(content.to_string())
}
// endregion: --- Model

// region:    --- Commands
/// 댓글 작성
pub async fn handle_add_comment(
    listing_id: i64,
    commenter_id: i64,
    cmd: AddCommentCommand,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Comment, AppError> {
    info!(
        "{:<12} --> 댓글 작성 listing: {}, user: {}",
        "Command", listing_id, commenter_id
    );
    let content = normalize_content(&cmd.content)?;
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut tx = db_manager.pool().begin().await?;

        let version = event_store.current_version(&mut tx, listing_id).await?;
        // 없는 상품이면 404
        handlers::fetch_listing(&mut tx, listing_id).await?;

        let (comment_id, timestamp) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO comments (listing_id, commenter_id, content, timestamp)
             VALUES ($1, $2, $3, $4)
             RETURNING id, timestamp",
        )
        .bind(listing_id)
        .bind(commenter_id)
        .bind(&content)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let event = ListingEvent::CommentAdded {
            listing_id,
            comment_id,
            commenter_id,
            timestamp,
        };

        let Some(stored) = event_store.append_event(&mut tx, version, &event).await? else {
            warn!("{:<12} --> 댓글 작성 중 버전 충돌: 재시도", "Command");
            tx.rollback().await?;
            retries += 1;
            continue;
        };

        tx.commit().await?;
        event_store.publish_event(&stored).await;

        return Ok(handlers::get_comment(db_manager, comment_id).await?);
    }

    Err(AppError::MaxRetriesExceeded)
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("  nice item \n").unwrap(), "nice item");
        assert!(normalize_content(" \t ").is_err());
        assert!(normalize_content(&"a".repeat(CONTENT_MAX_LEN + 1)).is_err());
        assert!(normalize_content(&"a".repeat(CONTENT_MAX_LEN)).is_ok());
    }
}
