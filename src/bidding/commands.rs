/// 입찰 커맨드 처리
// region:    --- Imports
use super::model::BidReceipt;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{EventStore, MAX_RETRIES};
use crate::listing::events::ListingEvent;
use crate::listing::model::Listing;
use crate::query::handlers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub amount: i64,
}

/// 입찰 가능 여부 검증
/// 시작가보다 높고, 기존 최고 입찰이 있으면 그보다도 높아야 한다
pub fn validate_bid(
    listing: &Listing,
    bidder_id: i64,
    amount: i64,
    highest_bid: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !listing.is_active() {
        return Err(AppError::NotActive);
    }
    if now > listing.end_time {
        return Err(AppError::AlreadyEnded);
    }
    if listing.seller_id == bidder_id {
        return Err(AppError::SelfBid);
    }

    let floor = highest_bid.map_or(listing.starting_bid, |highest| {
        highest.max(listing.starting_bid)
    });
    if amount <= floor {
        return Err(AppError::LowBid {
            amount,
            current_price: listing.current_price,
        });
    }
    Ok(())
}

/// 입찰
pub async fn handle_place_bid(
    listing_id: i64,
    bidder_id: i64,
    cmd: PlaceBidCommand,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<BidReceipt, AppError> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작 listing: {}, bidder: {}, {:?}",
        "Command", listing_id, bidder_id, cmd
    );
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut tx = db_manager.pool().begin().await?;

        // 현재 버전 조회
        let current_version = event_store.current_version(&mut tx, listing_id).await?;

        // 상품 및 최고 입찰 조회
        let listing = handlers::fetch_listing(&mut tx, listing_id).await?;
        let highest_bid = handlers::fetch_highest_bid(&mut tx, listing_id)
            .await?
            .map(|bid| bid.amount);

        let now = Utc::now();
        validate_bid(&listing, bidder_id, cmd.amount, highest_bid, now)?;

        let event = ListingEvent::BidPlaced {
            listing_id,
            bidder_id,
            amount: cmd.amount,
            timestamp: now,
        };

        // 이벤트 저장. 같은 버전을 먼저 쓴 요청이 있으면 처음부터 다시
        let Some(stored) = event_store
            .append_event(&mut tx, current_version, &event)
            .await?
        else {
            warn!(
                "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
                "Command"
            );
            tx.rollback().await?;
            retries += 1;
            continue;
        };

        // 현재 가격 갱신 (더 높은 가격일 때만)
        let current_price = sqlx::query_scalar::<_, i64>(
            "UPDATE listings SET current_price = $1
             WHERE id = $2 AND current_price < $1 AND status = 'active'
             RETURNING current_price",
        )
        .bind(cmd.amount)
        .bind(listing_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current_price) = current_price else {
            // 검증 이후 상태가 바뀜. 다시 읽어서 검증하면 알맞은 오류가 난다
            tx.rollback().await?;
            retries += 1;
            continue;
        };

        let bid_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO bids (listing_id, bidder_id, amount, timestamp)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(listing_id)
        .bind(bidder_id)
        .bind(cmd.amount)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        event_store.publish_event(&stored).await;

        info!(
            "{:<12} --> 입찰 성공 listing: {}, 현재 가격 {}",
            "Command", listing_id, current_price
        );
        return Ok(BidReceipt {
            bid_id,
            listing_id,
            amount: cmd.amount,
            current_price,
            timestamp: now,
        });
    }

    Err(AppError::MaxRetriesExceeded)
}

// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::model::ListingStatus;
    use chrono::Duration;

    fn listing() -> Listing {
        let now = Utc::now();
        Listing {
            id: 1,
            title: "Bike".to_string(),
            description: "Road bike".to_string(),
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(23),
            starting_bid: 10000,
            current_price: 10000,
            category: "Sports".to_string(),
            image_url: None,
            status: ListingStatus::Active.as_str().to_string(),
            seller_id: 1,
            seller_username: "seller".to_string(),
            winner_id: None,
            created_at: now,
        }
    }

    #[test]
    fn test_first_bid_must_exceed_starting_bid() {
        let listing = listing();
        let now = Utc::now();
        let err = validate_bid(&listing, 2, 10000, None, now).unwrap_err();
        assert_eq!(err.code(), "LOW_BID");
        assert!(validate_bid(&listing, 2, 10001, None, now).is_ok());
    }

    #[test]
    fn test_bid_must_exceed_highest_bid() {
        let mut listing = listing();
        listing.current_price = 15000;
        let now = Utc::now();
        let err = validate_bid(&listing, 2, 15000, Some(15000), now).unwrap_err();
        assert!(matches!(
            err,
            AppError::LowBid {
                amount: 15000,
                current_price: 15000
            }
        ));
        assert!(validate_bid(&listing, 2, 15001, Some(15000), now).is_ok());
    }

    #[test]
    fn test_seller_cannot_bid() {
        let err = validate_bid(&listing(), 1, 20000, None, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "SELF_BID");
    }

    #[test]
    fn test_inactive_or_ended_listing_rejects_bids() {
        let mut closed = listing();
        closed.status = ListingStatus::Closed.as_str().to_string();
        let err = validate_bid(&closed, 2, 20000, None, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "NOT_ACTIVE");

        let ended = listing();
        let later = ended.end_time + Duration::seconds(1);
        let err = validate_bid(&ended, 2, 20000, None, later).unwrap_err();
        assert_eq!(err.code(), "ALREADY_ENDED");
    }
}
