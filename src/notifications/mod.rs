/// 관심 목록 알림
/// Kafka로 발행된 상품 이벤트를 구독해
/// 해당 상품을 관심 목록에 둔 사용자에게 알림을 남긴다.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::Event;
use crate::listing::events::ListingEvent;
use crate::message_broker::KafkaConsumer;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};

// endregion: --- Imports

/// 읽은 알림 보관 기간
pub const READ_RETENTION_DAYS: i64 = 30;

// region:    --- Model
// 알림 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub listing_id: i64,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// 센트 단위 금액 표시
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, cents / 100, cents % 100)
}

/// 관심 목록 사용자에게 보낼 메시지
pub fn watcher_message(event: &ListingEvent, title: &str) -> Option<String> {
    match event {
        ListingEvent::ListingCreated { .. } => None,
        ListingEvent::BidPlaced { amount, .. } => Some(format!(
            "New bid of {} on \"{}\".",
            format_amount(*amount),
            title
        )),
        ListingEvent::CommentAdded { .. } => Some(format!("New comment on \"{}\".", title)),
        ListingEvent::AuctionClosed {
            winner_id: Some(_),
            final_price,
            ..
        } => Some(format!(
            "Auction \"{}\" closed. Winning bid: {}.",
            title,
            format_amount(*final_price)
        )),
        ListingEvent::AuctionClosed { winner_id: None, .. } => {
            Some(format!("Auction \"{}\" closed without a winner.", title))
        }
        ListingEvent::AuctionExpired { .. } => {
            Some(format!("Auction \"{}\" expired without any bids.", title))
        }
    }
}

/// 낙찰자에게 보낼 메시지
pub fn winner_message(event: &ListingEvent, title: &str) -> Option<(i64, String)> {
    match event {
        ListingEvent::AuctionClosed {
            winner_id: Some(winner_id),
            final_price,
            ..
        } => Some((
            *winner_id,
            format!("You won \"{}\" for {}.", title, format_amount(*final_price)),
        )),
        _ => None,
    }
}
// endregion: --- Model

// region:    --- Commands
/// 사용자의 알림을 모두 읽음 처리
pub async fn handle_mark_all_read(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
    )
    .bind(user_id)
    .execute(db_manager.pool())
    .await?;

    let cutoff = Utc::now() - TimeDelta::days(READ_RETENTION_DAYS);
    prune_read_notifications(db_manager, user_id, cutoff).await?;
    Ok(result.rows_affected())
}

/// `before` 이전에 만들어진 읽은 알림 삭제
pub async fn prune_read_notifications(
    db_manager: &DatabaseManager,
    user_id: i64,
    before: DateTime<Utc>,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM notifications WHERE user_id = $1 AND read = TRUE AND created_at < $2",
    )
    .bind(user_id)
    .bind(before)
    .execute(db_manager.pool())
    .await?;

    if result.rows_affected() > 0 {
        info!(
            "{:<12} --> 읽은 알림 {}건 삭제 user_id: {}",
            "Notifier",
            result.rows_affected(),
            user_id
        );
    }
    Ok(result.rows_affected())
}
// endregion: --- Commands

// region:    --- Notification Consumer
/// 이벤트 구독 후 알림 기록
pub struct NotificationConsumer {
    pool: Arc<PgPool>,
    kafka_consumer: Arc<KafkaConsumer>,
    topic: String,
}

impl NotificationConsumer {
    pub fn new(
        pool: Arc<PgPool>,
        kafka_consumer: Arc<KafkaConsumer>,
        topic: impl Into<String>,
    ) -> Self {
        NotificationConsumer {
            pool,
            kafka_consumer,
            topic: topic.into(),
        }
    }

    /// 구독 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        if let Err(e) = self
            .kafka_consumer
            .consume_events(&self.topic, move |event| {
                let pool = Arc::clone(&pool);
                async move { Self::process_event(&pool, event).await }
            })
            .await
        {
            error!("{:<12} --> 이벤트 구독 오류: {:?}", "Notifier", e);
        }
    }

    /// 이벤트 처리. 같은 이벤트를 다시 받아도 알림은 한 번만 남는다
    async fn process_event(pool: &PgPool, event: Event) -> Result<(), AppError> {
        let listing_event = event.listing_event()?;
        let listing_id = listing_event.listing_id();

        let title = sqlx::query_scalar::<_, String>("SELECT title FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(pool)
            .await?;
        let Some(title) = title else {
            warn!("{:<12} --> 상품 없음, 알림 생략 id: {}", "Notifier", listing_id);
            return Ok(());
        };

        let winner = winner_message(&listing_event, &title);

        if let Some(message) = watcher_message(&listing_event, &title) {
            let result = sqlx::query(
                "INSERT INTO notifications (user_id, listing_id, event_id, message)
                 SELECT w.user_id, w.listing_id, $2, $3 FROM watchlist w
                 WHERE w.listing_id = $1
                   AND w.user_id IS DISTINCT FROM $4
                   AND w.user_id IS DISTINCT FROM $5
                 ON CONFLICT (event_id, user_id) DO NOTHING",
            )
            .bind(listing_id)
            .bind(event.id)
            .bind(&message)
            .bind(listing_event.actor_id())
            .bind(winner.as_ref().map(|(winner_id, _)| *winner_id))
            .execute(pool)
            .await?;

            info!(
                "{:<12} --> {} 알림 {}건 (listing={})",
                "Notifier",
                event.event_type,
                result.rows_affected(),
                listing_id
            );
        }

        if let Some((winner_id, message)) = winner {
            sqlx::query(
                "INSERT INTO notifications (user_id, listing_id, event_id, message)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (event_id, user_id) DO NOTHING",
            )
            .bind(winner_id)
            .bind(listing_id)
            .bind(event.id)
            .bind(&message)
            .execute(pool)
            .await?;
        }

        Ok(())
    }
}
// endregion: --- Notification Consumer

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(123456), "1234.56");
    }

    #[test]
    fn test_watcher_messages() {
        let now = Utc::now();
        let bid = ListingEvent::BidPlaced {
            listing_id: 1,
            bidder_id: 2,
            amount: 1550,
            timestamp: now,
        };
        assert_eq!(
            watcher_message(&bid, "Lamp").as_deref(),
            Some("New bid of 15.50 on \"Lamp\".")
        );

        let created = ListingEvent::ListingCreated {
            listing_id: 1,
            seller_id: 2,
            title: "Lamp".to_string(),
            starting_bid: 100,
            timestamp: now,
        };
        assert_eq!(watcher_message(&created, "Lamp"), None);

        let unsold = ListingEvent::AuctionClosed {
            listing_id: 1,
            closed_by: Some(2),
            winner_id: None,
            final_price: 100,
            timestamp: now,
        };
        assert_eq!(
            watcher_message(&unsold, "Lamp").as_deref(),
            Some("Auction \"Lamp\" closed without a winner.")
        );
        assert_eq!(winner_message(&unsold, "Lamp"), None);
    }

    #[test]
    fn test_winner_message() {
        let sold = ListingEvent::AuctionClosed {
            listing_id: 1,
            closed_by: None,
            winner_id: Some(9),
            final_price: 2000,
            timestamp: Utc::now(),
        };
        assert_eq!(
            winner_message(&sold, "Lamp"),
            Some((9, "You won \"Lamp\" for 20.00.".to_string()))
        );
    }
}
