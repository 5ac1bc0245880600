/// 상품 관련 커맨드 처리
/// 1. 상품 등록
/// 2. 경매 종료 (판매자)
/// 3. 기간 만료 처리 (스케줄러)
// region:    --- Imports
use super::events::ListingEvent;
use super::model::{CreateListingCommand, Listing, ListingStatus};
use crate::config::hours_after;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{EventStore, MAX_RETRIES};
use crate::query::handlers;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Settlement
/// 경매를 끝내는 주체
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// 판매자가 직접 종료
    BySeller(i64),
    /// 종료 시간 경과
    Expired,
}

/// 종료 결과: 새 상태와 낙찰자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub status: ListingStatus,
    pub winner_id: Option<i64>,
    pub final_price: i64,
}

/// 종료 가능 여부 확인 후 결과 계산
pub fn settle(
    listing: &Listing,
    finish: Finish,
    highest: Option<(i64, i64)>,
) -> Result<Settlement, AppError> {
    if let Finish::BySeller(user_id) = finish {
        if listing.seller_id != user_id {
            return Err(AppError::Forbidden(
                "You are not authorized to close this auction.".to_string(),
            ));
        }
    }
    if !listing.is_active() {
        return Err(AppError::NotActive);
    }

    let winner_id = highest.map(|(bidder_id, _)| bidder_id);
    let final_price = highest.map_or(listing.current_price, |(_, amount)| amount);
    let status = match (finish, winner_id) {
        (Finish::Expired, None) => ListingStatus::Expired,
        _ => ListingStatus::Closed,
    };

    Ok(Settlement {
        status,
        winner_id,
        final_price,
    })
}

fn settlement_event(
    listing_id: i64,
    finish: Finish,
    settlement: &Settlement,
    timestamp: DateTime<Utc>,
) -> ListingEvent {
    match settlement.status {
        ListingStatus::Expired => ListingEvent::AuctionExpired {
            listing_id,
            timestamp,
        },
        _ => ListingEvent::AuctionClosed {
            listing_id,
            closed_by: match finish {
                Finish::BySeller(user_id) => Some(user_id),
                Finish::Expired => None,
            },
            winner_id: settlement.winner_id,
            final_price: settlement.final_price,
            timestamp,
        },
    }
}
// endregion: --- Settlement

// region:    --- Commands
/// 1. 상품 등록
pub async fn handle_create_listing(
    seller_id: i64,
    cmd: CreateListingCommand,
    duration_hours: i64,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Listing, AppError> {
    info!("{:<12} --> 상품 등록 요청: {:?}", "Command", cmd);
    let cmd = cmd.normalized()?;

    let start_time = Utc::now();
    let end_time = hours_after(start_time, duration_hours).ok_or_else(|| {
        AppError::Internal(format!("listing duration out of range: {}h", duration_hours))
    })?;

    let mut tx = db_manager.pool().begin().await?;

    let listing_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO listings
            (title, description, start_time, end_time, starting_bid, current_price,
             category, image_url, status, seller_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $5, $6, $7, $8, $9, $3)
         RETURNING id",
    )
    .bind(&cmd.title)
    .bind(&cmd.description)
    .bind(start_time)
    .bind(end_time)
    .bind(cmd.starting_bid)
    .bind(&cmd.category)
    .bind(&cmd.image_url)
    .bind(ListingStatus::Active.as_str())
    .bind(seller_id)
    .fetch_one(&mut *tx)
    .await?;

    let event = ListingEvent::ListingCreated {
        listing_id,
        seller_id,
        title: cmd.title.clone(),
        starting_bid: cmd.starting_bid,
        timestamp: start_time,
    };

    // 새 상품이라 버전 충돌이 날 수 없다
    let stored = event_store
        .append_event(&mut tx, 0, &event)
        .await?
        .ok_or_else(|| AppError::Internal(format!("listing {} already has events", listing_id)))?;

    let listing = handlers::fetch_listing(&mut tx, listing_id).await?;
    tx.commit().await?;
    event_store.publish_event(&stored).await;

    info!("{:<12} --> 상품 등록 완료 id: {}", "Command", listing_id);
    Ok(listing)
}

/// 2, 3. 경매 종료 (판매자 종료 또는 기간 만료)
pub async fn handle_finish_listing(
    listing_id: i64,
    finish: Finish,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Listing, AppError> {
    info!(
        "{:<12} --> 경매 종료 요청 id: {}, {:?}",
        "Command", listing_id, finish
    );
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let mut tx = db_manager.pool().begin().await?;

        // 현재 버전 조회
        let version = event_store.current_version(&mut tx, listing_id).await?;

        let listing = handlers::fetch_listing(&mut tx, listing_id).await?;
        let highest = handlers::fetch_highest_bid(&mut tx, listing_id)
            .await?
            .map(|bid| (bid.bidder_id, bid.amount));

        let settlement = settle(&listing, finish, highest)?;
        let event = settlement_event(listing_id, finish, &settlement, Utc::now());

        let Some(stored) = event_store.append_event(&mut tx, version, &event).await? else {
            warn!("{:<12} --> 경매 종료 중 버전 충돌: 재시도", "Command");
            tx.rollback().await?;
            retries += 1;
            continue;
        };

        let updated = sqlx::query(
            "UPDATE listings SET status = $1, winner_id = $2
             WHERE id = $3 AND status = 'active'",
        )
        .bind(settlement.status.as_str())
        .bind(settlement.winner_id)
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            retries += 1;
            continue;
        }

        let listing = handlers::fetch_listing(&mut tx, listing_id).await?;
        tx.commit().await?;
        event_store.publish_event(&stored).await;

        info!(
            "{:<12} --> 경매 종료 id: {}, 상태: {}, 낙찰자: {:?}",
            "Command", listing_id, listing.status, listing.winner_id
        );
        return Ok(listing);
    }

    Err(AppError::MaxRetriesExceeded)
}

// endregion: --- Commands
